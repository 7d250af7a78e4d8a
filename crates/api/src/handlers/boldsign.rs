//! Pass-through handlers for the BoldSign adapter.
//!
//! Each call constructs the adapter from a freshly resolved tenant
//! credential. Reads go through the bounded retry policy; the send path
//! is dispatched exactly once.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use caresign_core::error::CoreError;
use caresign_core::roles::{self, SignerInput};
use caresign_core::signature::{Provider, DEFAULT_ROLE};
use caresign_providers::adapter::SendRequest;
use caresign_providers::retry::{retry_idempotent, with_timeout, RetryPolicy};

use crate::engine::credentials;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthAgency;
use crate::response::DataResponse;
use crate::state::AppState;

/// One signer in a send payload.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct SignerPayload {
    #[validate(length(min = 1, message = "Signer name is required"))]
    pub name: String,
    #[validate(email(message = "Signer email is not a valid address"))]
    pub email: String,
}

/// Body for `POST /boldsign/send`.
#[derive(Debug, Deserialize, Validate)]
pub struct BoldSignSendRequest {
    pub template_id: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub message: Option<String>,
    #[validate(length(min = 1, message = "At least one signer is required"), nested)]
    pub signers: Vec<SignerPayload>,
    /// Declared role names, when the caller already has them from the
    /// template listing. Omitting them triggers a template lookup.
    pub roles: Option<Vec<String>>,
}

/// Query parameters for `GET /boldsign/documents`.
#[derive(Debug, Deserialize)]
pub struct DocumentListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// GET /api/v1/boldsign/templates
pub async fn list_templates(
    auth: AuthAgency,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let adapter = credentials::build_signature_adapter(
        &state.pool,
        &state.config,
        auth.agency_id,
        Provider::BoldSign,
    )
    .await?;

    let policy = RetryPolicy::default();
    let templates = retry_idempotent(&policy, || {
        with_timeout(state.config.provider_timeout_secs, adapter.list_templates())
    })
    .await?;

    Ok(Json(serde_json::json!({ "data": templates })))
}

/// POST /api/v1/boldsign/send
///
/// Resolve the template's declared roles, assign the supplied signers
/// positionally (placeholder-filling any remaining roles), and dispatch.
/// Exercises the template-send → document-send fallback cascade.
pub async fn send(
    auth: AuthAgency,
    State(state): State<AppState>,
    Json(payload): Json<BoldSignSendRequest>,
) -> AppResult<Json<DataResponse<caresign_providers::adapter::SendOutcome>>> {
    payload
        .validate()
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    let adapter = credentials::build_signature_adapter(
        &state.pool,
        &state.config,
        auth.agency_id,
        Provider::BoldSign,
    )
    .await?;

    let declared = match payload.roles {
        Some(roles) if !roles.is_empty() => roles,
        _ => {
            let policy = RetryPolicy::default();
            let templates = retry_idempotent(&policy, || {
                with_timeout(state.config.provider_timeout_secs, adapter.list_templates())
            })
            .await?;
            templates
                .into_iter()
                .find(|t| t.id == payload.template_id)
                .map(|t| t.roles)
                .ok_or_else(|| {
                    AppError::Core(CoreError::Validation(format!(
                        "Unknown template '{}'",
                        payload.template_id
                    )))
                })?
        }
    };
    // A template without declared roles still needs one role per signer.
    let declared = if declared.is_empty() {
        (1..=payload.signers.len())
            .map(|n| format!("{DEFAULT_ROLE} {n}"))
            .collect()
    } else {
        declared
    };

    let signers: Vec<SignerInput> = payload
        .signers
        .into_iter()
        .map(|s| SignerInput {
            name: s.name,
            email: s.email,
        })
        .collect();
    let resolved = roles::resolve(&declared, &signers)?;

    let outcome = with_timeout(
        state.config.provider_timeout_secs,
        adapter.send(&SendRequest {
            document_id: payload.template_id,
            title: payload.title,
            message: payload.message.unwrap_or_default(),
            signers: resolved,
        }),
    )
    .await?;

    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/boldsign/document/{id}
pub async fn get_document(
    auth: AuthAgency,
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let adapter = credentials::build_signature_adapter(
        &state.pool,
        &state.config,
        auth.agency_id,
        Provider::BoldSign,
    )
    .await?;

    let policy = RetryPolicy::default();
    let status = retry_idempotent(&policy, || {
        with_timeout(
            state.config.provider_timeout_secs,
            adapter.get_status(&document_id),
        )
    })
    .await?;

    Ok(Json(serde_json::json!({ "data": status })))
}

/// GET /api/v1/boldsign/documents
pub async fn list_documents(
    auth: AuthAgency,
    State(state): State<AppState>,
    Query(params): Query<DocumentListQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(10).clamp(1, 100);

    let adapter = credentials::build_signature_adapter(
        &state.pool,
        &state.config,
        auth.agency_id,
        Provider::BoldSign,
    )
    .await?;

    let policy = RetryPolicy::default();
    let documents = retry_idempotent(&policy, || {
        with_timeout(
            state.config.provider_timeout_secs,
            adapter.list_documents(page, page_size),
        )
    })
    .await?;

    Ok(Json(serde_json::json!({ "data": documents })))
}
