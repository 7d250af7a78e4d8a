pub mod boldsign;
pub mod health;
pub mod integrations;
pub mod signatures;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /signatures                       list (GET), create (POST), bulk cleanup (DELETE)
/// /signatures/{id}                  get
/// /signatures/{id}/sync             manual provider status sync (POST)
///
/// /boldsign/templates               template list
/// /boldsign/send                    template send (with document fallback)
/// /boldsign/document/{id}           document status
/// /boldsign/documents               document list
///
/// /integrations/jotform             action-dispatched JotForm operations
/// /integrations/resend              action-dispatched email operations
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/signatures", signatures::router())
        .nest("/boldsign", boldsign::router())
        .nest("/integrations", integrations::router())
}
