//! Route definitions for the BoldSign pass-through endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::boldsign;
use crate::state::AppState;

/// Routes mounted at `/boldsign`.
///
/// ```text
/// GET    /templates       -> list_templates
/// POST   /send            -> send
/// GET    /document/{id}   -> get_document
/// GET    /documents       -> list_documents
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/templates", get(boldsign::list_templates))
        .route("/send", post(boldsign::send))
        .route("/document/{id}", get(boldsign::get_document))
        .route("/documents", get(boldsign::list_documents))
}
