//! Route definitions for the action-dispatched integration endpoints.

use axum::routing::post;
use axum::Router;

use crate::handlers::integrations;
use crate::state::AppState;

/// Routes mounted at `/integrations`.
///
/// ```text
/// POST /jotform   -> jotform (action: getForms | getForm | getSubmissions | sendSignatureRequest)
/// POST /resend    -> resend  (action: sendEmail)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jotform", post(integrations::jotform))
        .route("/resend", post(integrations::resend))
}
