//! On-demand provider status reconciliation.
//!
//! No inbound webhook exists in this design: sync is triggered manually
//! per request, pulls the provider's current state through the adapter,
//! and applies a guarded patch. Invoking sync on an already terminal
//! request performs no provider call and no write.

use serde::Serialize;

use caresign_core::error::CoreError;
use caresign_core::signature::RequestStatus;
use caresign_core::types::DbId;
use caresign_db::models::signature_request::{SignatureRequest, SignatureRequestPatch};
use caresign_db::repositories::SignatureRequestRepo;
use caresign_db::DbPool;
use caresign_providers::adapter::{ProviderAdapter, ProviderStatus};
use caresign_providers::retry::{retry_idempotent, with_timeout, RetryPolicy};

use crate::engine::credentials;
use crate::error::AppError;
use crate::state::AppState;

/// Outcome of a manual status sync.
#[derive(Debug, Serialize)]
pub struct SyncOutcome {
    pub request: SignatureRequest,
    /// True when the stored request was updated by this sync.
    pub changed: bool,
    /// True when the provider reported no signature activity yet.
    pub pending: bool,
}

/// Sync one request using per-call resolved credentials.
pub async fn sync(
    state: &AppState,
    agency_id: DbId,
    request_id: DbId,
) -> Result<SyncOutcome, AppError> {
    let request = SignatureRequestRepo::get(&state.pool, agency_id, request_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "SignatureRequest",
            id: request_id,
        })?;

    // Terminal requests short-circuit before any credential resolution or
    // provider call, keeping repeated syncs idempotent and cheap.
    if request.lifecycle_status()?.is_terminal() {
        return Ok(SyncOutcome {
            request,
            changed: false,
            pending: false,
        });
    }

    let provider = request.provider_kind()?;
    let adapter =
        credentials::build_signature_adapter(&state.pool, &state.config, agency_id, provider)
            .await?;
    sync_with_adapter(
        &state.pool,
        agency_id,
        adapter.as_ref(),
        state.config.provider_timeout_secs,
        request,
    )
    .await
}

/// Sync flow against an already-constructed adapter. Separated from
/// [`sync`] so tests can drive it with a stub adapter.
pub async fn sync_with_adapter(
    pool: &DbPool,
    agency_id: DbId,
    adapter: &dyn ProviderAdapter,
    timeout_secs: u64,
    request: SignatureRequest,
) -> Result<SyncOutcome, AppError> {
    if request.lifecycle_status()?.is_terminal() {
        return Ok(SyncOutcome {
            request,
            changed: false,
            pending: false,
        });
    }

    let document_id = request
        .external_document_id
        .clone()
        .unwrap_or_else(|| request.external_request_id.clone());

    // Status reads are idempotent: safe to retry under the bounded policy.
    let policy = RetryPolicy::default();
    let provider_status = retry_idempotent(&policy, || {
        with_timeout(timeout_secs, adapter.get_status(&document_id))
    })
    .await?;

    let patch = match provider_status {
        ProviderStatus::Pending => {
            tracing::debug!(request_id = request.id, "Provider reports no submission yet");
            return Ok(SyncOutcome {
                request,
                changed: false,
                pending: true,
            });
        }
        ProviderStatus::Completed {
            signed_document_url,
            completed_at,
        } => SignatureRequestPatch {
            status: Some(RequestStatus::Completed),
            signed_date: Some(completed_at.unwrap_or_else(chrono::Utc::now)),
            signed_document_url,
            ..Default::default()
        },
        ProviderStatus::Declined => SignatureRequestPatch {
            status: Some(RequestStatus::Declined),
            ..Default::default()
        },
        ProviderStatus::Expired => SignatureRequestPatch {
            status: Some(RequestStatus::Expired),
            ..Default::default()
        },
    };

    let updated = SignatureRequestRepo::apply_patch(pool, agency_id, request.id, patch).await?;
    tracing::info!(
        request_id = updated.id,
        status = %updated.status,
        "Signature request status synced",
    );

    Ok(SyncOutcome {
        request: updated,
        changed: true,
        pending: false,
    })
}
