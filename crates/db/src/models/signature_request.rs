//! Signature request entity models and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use caresign_core::error::CoreError;
use caresign_core::signature::{Provider, Recipient, RequestStatus};
use caresign_core::types::{DbId, Timestamp};

/// A row from the `signature_requests` table.
///
/// `provider` and `status` are stored as text and parsed into their typed
/// enums at the boundaries; `recipients` is an ordered, non-empty JSONB
/// array of [`Recipient`] values.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SignatureRequest {
    pub id: DbId,
    pub agency_id: DbId,
    pub title: String,
    pub custom_message: Option<String>,
    pub provider: String,
    pub external_request_id: String,
    pub external_document_id: Option<String>,
    pub recipients: serde_json::Value,
    pub status: String,
    pub sent_date: Option<Timestamp>,
    pub signed_date: Option<Timestamp>,
    pub signature_url: Option<String>,
    pub signed_document_url: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SignatureRequest {
    /// Parse the stored status into the typed lifecycle status.
    pub fn lifecycle_status(&self) -> Result<RequestStatus, CoreError> {
        self.status.parse()
    }

    /// Parse the stored provider into the typed provider enum.
    pub fn provider_kind(&self) -> Result<Provider, CoreError> {
        self.provider.parse()
    }

    /// Deserialize the stored recipient list.
    pub fn recipient_list(&self) -> Result<Vec<Recipient>, CoreError> {
        serde_json::from_value(self.recipients.clone()).map_err(|err| {
            CoreError::Internal(format!(
                "Stored recipients for request {} are malformed: {err}",
                self.id
            ))
        })
    }
}

/// DTO for inserting a new signature request row.
#[derive(Debug, Clone)]
pub struct NewSignatureRequest {
    pub title: String,
    pub custom_message: Option<String>,
    pub provider: Provider,
    pub external_request_id: String,
    pub external_document_id: Option<String>,
    pub recipients: Vec<Recipient>,
    pub status: RequestStatus,
    pub sent_date: Option<Timestamp>,
    pub signature_url: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Partial update applied by the status synchronizer (or by the provider's
/// terminal response at creation time).
#[derive(Debug, Clone, Default)]
pub struct SignatureRequestPatch {
    pub status: Option<RequestStatus>,
    pub signed_date: Option<Timestamp>,
    pub signature_url: Option<String>,
    pub signed_document_url: Option<String>,
    pub external_document_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Optional filters for a tenant-scoped listing.
#[derive(Debug, Clone, Default)]
pub struct SignatureRequestFilter {
    pub provider: Option<Provider>,
    pub status: Option<RequestStatus>,
}
