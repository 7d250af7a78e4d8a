//! Action-dispatched integration endpoints.
//!
//! `POST /integrations/jotform` and `POST /integrations/resend` accept an
//! internally tagged `action` field, modeled as a typed enum so dispatch
//! is exhaustive and typo-proof.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use caresign_core::signature::Provider;
use caresign_core::types::DbId;
use caresign_db::models::signature_request::SignatureRequest;
use caresign_providers::adapter::ProviderAdapter;
use caresign_providers::jotform::JotFormAdapter;
use caresign_providers::resend::OutgoingEmail;
use caresign_providers::retry::{retry_idempotent, with_timeout, RetryPolicy};

use crate::engine::{composer, credentials};
use crate::error::{AppError, AppResult};
use crate::handlers::signatures::RecipientInput;
use crate::middleware::auth::AuthAgency;
use crate::notifications::dispatcher::DeliveryOutcome;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// JotForm
// ---------------------------------------------------------------------------

/// Actions accepted by `POST /integrations/jotform`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum JotFormAction {
    GetForms,
    GetForm {
        form_id: String,
    },
    GetSubmissions {
        form_id: String,
    },
    SendSignatureRequest {
        form_id: String,
        title: String,
        #[serde(default)]
        custom_message: Option<String>,
        recipients: Vec<RecipientInput>,
    },
}

/// Response payload for the `sendSignatureRequest` action.
#[derive(Debug, Serialize)]
struct JotFormSendResponse {
    requests: Vec<SignatureRequest>,
    deliveries: Vec<DeliveryOutcome>,
    form_url: Option<String>,
}

/// Construct the JotForm adapter from a freshly resolved tenant credential.
async fn jotform_adapter(state: &AppState, agency_id: DbId) -> Result<JotFormAdapter, AppError> {
    let credential = credentials::resolve_provider_credential(
        &state.pool,
        &state.config,
        agency_id,
        Provider::JotForm,
    )
    .await?;
    Ok(match state.config.providers.jotform_api_url.as_deref() {
        Some(url) => JotFormAdapter::with_base_url(credential, url.to_string()),
        None => JotFormAdapter::new(credential),
    })
}

/// POST /api/v1/integrations/jotform
pub async fn jotform(
    auth: AuthAgency,
    State(state): State<AppState>,
    Json(action): Json<JotFormAction>,
) -> AppResult<impl IntoResponse> {
    let timeout_secs = state.config.provider_timeout_secs;
    let policy = RetryPolicy::default();

    match action {
        JotFormAction::GetForms => {
            let adapter = jotform_adapter(&state, auth.agency_id).await?;
            let forms = retry_idempotent(&policy, || {
                with_timeout(timeout_secs, adapter.list_templates())
            })
            .await?;
            Ok(Json(serde_json::json!({ "data": forms })).into_response())
        }
        JotFormAction::GetForm { form_id } => {
            let adapter = jotform_adapter(&state, auth.agency_id).await?;
            let form = retry_idempotent(&policy, || {
                with_timeout(timeout_secs, adapter.get_form(&form_id))
            })
            .await?;
            Ok(Json(serde_json::json!({ "data": form })).into_response())
        }
        JotFormAction::GetSubmissions { form_id } => {
            let adapter = jotform_adapter(&state, auth.agency_id).await?;
            let submissions = retry_idempotent(&policy, || {
                with_timeout(timeout_secs, adapter.list_submissions(&form_id))
            })
            .await?;
            Ok(Json(serde_json::json!({ "data": submissions })).into_response())
        }
        JotFormAction::SendSignatureRequest {
            form_id,
            title,
            custom_message,
            recipients,
        } => {
            for recipient in &recipients {
                recipient
                    .validate()
                    .map_err(|err| AppError::BadRequest(err.to_string()))?;
            }
            let input = composer::SubmissionInput {
                provider: Provider::JotForm,
                external_request_id: form_id,
                title,
                custom_message,
                recipients: recipients
                    .into_iter()
                    .map(RecipientInput::into_recipient)
                    .collect(),
                initial_status: None,
                form_url: None,
                metadata: None,
            };
            let result = composer::submit(&state, auth.agency_id, input).await?;
            let form_url = result
                .requests
                .first()
                .and_then(|r| r.signature_url.clone());
            let body = JotFormSendResponse {
                requests: result.requests,
                deliveries: result.deliveries,
                form_url,
            };
            Ok((
                StatusCode::CREATED,
                Json(serde_json::json!({ "data": body })),
            )
                .into_response())
        }
    }
}

// ---------------------------------------------------------------------------
// Resend
// ---------------------------------------------------------------------------

/// Actions accepted by `POST /integrations/resend`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ResendAction {
    SendEmail {
        to: String,
        subject: String,
        html: String,
        #[serde(default)]
        from: Option<String>,
    },
}

/// POST /api/v1/integrations/resend
pub async fn resend(
    auth: AuthAgency,
    State(state): State<AppState>,
    Json(action): Json<ResendAction>,
) -> AppResult<Json<serde_json::Value>> {
    match action {
        ResendAction::SendEmail {
            to,
            subject,
            html,
            from,
        } => {
            let client =
                credentials::build_email_client(&state.pool, &state.config, auth.agency_id).await?;
            let from = match from {
                Some(from) => from,
                None => {
                    credentials::resolve_email_from(&state.pool, &state.config, auth.agency_id)
                        .await?
                }
            };
            // Email sends are not idempotent; dispatched exactly once.
            let message_id = with_timeout(
                state.config.provider_timeout_secs,
                client.send_email(&OutgoingEmail {
                    from,
                    to,
                    subject,
                    html,
                }),
            )
            .await?;

            Ok(Json(serde_json::json!({ "data": { "id": message_id } })))
        }
    }
}
