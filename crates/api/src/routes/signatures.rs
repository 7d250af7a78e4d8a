//! Route definitions for the `/signatures` resource.
//!
//! All endpoints require a tenant context.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::signatures;
use crate::state::AppState;

/// Routes mounted at `/signatures`.
///
/// ```text
/// GET    /              -> list_signatures
/// POST   /              -> create_signature
/// DELETE /              -> delete_signatures (bulk cleanup)
/// GET    /{id}          -> get_signature
/// POST   /{id}/sync     -> sync_signature
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(signatures::list_signatures)
                .post(signatures::create_signature)
                .delete(signatures::delete_signatures),
        )
        .route("/{id}", get(signatures::get_signature))
        .route("/{id}/sync", post(signatures::sync_signature))
}
