//! Handlers for the `/signatures` resource.
//!
//! All endpoints require a tenant context via [`AuthAgency`]; every store
//! access is scoped by the authenticated agency id.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use caresign_core::signature::{Provider, Recipient, RequestStatus, DEFAULT_ROLE};
use caresign_core::types::DbId;
use caresign_db::models::signature_request::SignatureRequestFilter;
use caresign_db::repositories::SignatureRequestRepo;

use crate::engine::{composer, sync};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthAgency;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / request types
// ---------------------------------------------------------------------------

/// Maximum page size for request listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for request listing.
const DEFAULT_LIMIT: i64 = 50;

/// Query parameters for `GET /signatures`.
#[derive(Debug, Deserialize)]
pub struct SignatureQuery {
    pub provider: Option<Provider>,
    pub status: Option<RequestStatus>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// One recipient in a create payload.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct RecipientInput {
    #[validate(length(min = 1, message = "Recipient name is required"))]
    pub name: String,
    #[validate(email(message = "Recipient email is not a valid address"))]
    pub email: String,
    pub role: Option<String>,
}

impl RecipientInput {
    pub fn into_recipient(self) -> Recipient {
        Recipient {
            name: self.name,
            email: self.email,
            role: self.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        }
    }
}

/// Body for `POST /signatures`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSignatureRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "At least one recipient is required"), nested)]
    pub recipients: Vec<RecipientInput>,
    pub custom_message: Option<String>,
    pub provider: Provider,
    /// Provider template/form identifier to send from.
    pub external_request_id: String,
    /// Optional initial status; only `draft` or `sent` are accepted.
    pub status: Option<RequestStatus>,
    /// Caller-known direct access URL (legacy JotForm path).
    pub form_url: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub related_entity_type: Option<String>,
    pub related_entity_id: Option<String>,
}

/// Fold the optional related-entity reference into the metadata bag.
fn merge_related_entity(
    metadata: Option<serde_json::Value>,
    entity_type: Option<String>,
    entity_id: Option<String>,
) -> Option<serde_json::Value> {
    if entity_type.is_none() && entity_id.is_none() {
        return metadata;
    }
    let mut value = metadata.unwrap_or_else(|| serde_json::json!({}));
    if !value.is_object() {
        value = serde_json::json!({ "metadata": value });
    }
    if let Some(object) = value.as_object_mut() {
        if let Some(entity_type) = entity_type {
            object.insert("related_entity_type".to_string(), entity_type.into());
        }
        if let Some(entity_id) = entity_id {
            object.insert("related_entity_id".to_string(), entity_id.into());
        }
    }
    Some(value)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/signatures
///
/// Compose and dispatch a signature request, persist the resulting row(s),
/// and trigger notification dispatch. Returns the created requests plus
/// per-recipient delivery outcomes.
pub async fn create_signature(
    auth: AuthAgency,
    State(state): State<AppState>,
    Json(payload): Json<CreateSignatureRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    let metadata = merge_related_entity(
        payload.metadata,
        payload.related_entity_type,
        payload.related_entity_id,
    );
    let input = composer::SubmissionInput {
        provider: payload.provider,
        external_request_id: payload.external_request_id,
        title: payload.title,
        custom_message: payload.custom_message,
        recipients: payload
            .recipients
            .into_iter()
            .map(RecipientInput::into_recipient)
            .collect(),
        initial_status: payload.status,
        form_url: payload.form_url,
        metadata,
    };

    let result = composer::submit(&state, auth.agency_id, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: result })))
}

/// GET /api/v1/signatures
///
/// List the tenant's signature requests, newest first.
pub async fn list_signatures(
    auth: AuthAgency,
    State(state): State<AppState>,
    Query(params): Query<SignatureQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let offset = params.offset.unwrap_or(0);
    let filter = SignatureRequestFilter {
        provider: params.provider,
        status: params.status,
    };

    let requests =
        SignatureRequestRepo::list(&state.pool, auth.agency_id, &filter, limit, offset).await?;

    Ok(Json(serde_json::json!({ "data": requests })))
}

/// GET /api/v1/signatures/{id}
pub async fn get_signature(
    auth: AuthAgency,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let request = SignatureRequestRepo::get(&state.pool, auth.agency_id, request_id)
        .await?
        .ok_or(AppError::Core(caresign_core::error::CoreError::NotFound {
            entity: "SignatureRequest",
            id: request_id,
        }))?;

    Ok(Json(serde_json::json!({ "data": request })))
}

/// POST /api/v1/signatures/{id}/sync
///
/// Pull the provider's current status for one request and reconcile the
/// stored row. Idempotent on terminal requests.
pub async fn sync_signature(
    auth: AuthAgency,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let outcome = sync::sync(&state, auth.agency_id, request_id).await?;
    Ok(Json(serde_json::json!({ "data": outcome })))
}

/// DELETE /api/v1/signatures
///
/// Tenant-initiated bulk cleanup, the only deletion path. Returns the
/// number of removed requests.
pub async fn delete_signatures(
    auth: AuthAgency,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let deleted = SignatureRequestRepo::delete_all(&state.pool, auth.agency_id).await?;

    tracing::info!(agency_id = auth.agency_id, deleted, "Bulk signature cleanup");
    Ok(Json(serde_json::json!({ "data": { "deleted": deleted } })))
}
