//! Root-level health route.

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Routes mounted at `/`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
