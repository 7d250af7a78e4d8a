//! The uniform contract every e-signature provider implements.

use async_trait::async_trait;
use serde::Serialize;

use caresign_core::roles::SignerRole;
use caresign_core::signature::{Provider, TemplateSummary};
use caresign_core::types::Timestamp;

use crate::boldsign::BoldSignAdapter;
use crate::credential::Credential;
use crate::error::ProviderError;
use crate::jotform::JotFormAdapter;

/// Input for a provider `send` call.
#[derive(Debug, Clone)]
pub struct SendRequest {
    /// Provider-side template/form identifier to send from.
    pub document_id: String,
    pub title: String,
    pub message: String,
    /// Ordered role assignments produced by the role resolver.
    pub signers: Vec<SignerRole>,
}

/// Result of a successful `send`.
#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    /// Provider-side identifier for the created signature request. For
    /// JotForm this is the form id: no request object exists provider-side.
    pub external_document_id: String,
    /// Direct-access signing links, when the provider returns them.
    pub signing_links: Vec<SigningLink>,
}

/// A per-signer direct access URL.
#[derive(Debug, Clone, Serialize)]
pub struct SigningLink {
    pub email: String,
    pub url: String,
}

/// Externally reported status of a sent request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProviderStatus {
    /// No signature activity yet.
    Pending,
    /// Terminal: the document was signed / the submission is active.
    Completed {
        signed_document_url: Option<String>,
        completed_at: Option<Timestamp>,
    },
    /// Terminal: a signer declined.
    Declined,
    /// Terminal: the request expired before completion.
    Expired,
}

/// Summary of a provider-side document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub name: String,
    pub status: String,
}

/// One page of a provider document listing.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentPage {
    pub documents: Vec<DocumentSummary>,
    pub total_count: i64,
}

/// Uniform interface over the external e-signature providers.
///
/// `send` is NOT idempotent: retrying a failed send creates a duplicate
/// real-world signature request, so callers surface the error instead of
/// retrying. `list_templates`, `get_status`, and `list_documents` are
/// idempotent reads and safe to retry.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// List the reusable templates (or forms) available to the credential.
    async fn list_templates(&self) -> Result<Vec<TemplateSummary>, ProviderError>;

    /// Dispatch a signature request. Never retried automatically.
    async fn send(&self, request: &SendRequest) -> Result<SendOutcome, ProviderError>;

    /// Fetch the provider-side status for a sent document.
    async fn get_status(&self, document_id: &str) -> Result<ProviderStatus, ProviderError>;

    /// Page through provider-side documents.
    async fn list_documents(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<DocumentPage, ProviderError>;
}

/// Construct the adapter for `provider` from a freshly resolved credential.
///
/// `base_url` overrides the provider's production endpoint (used by
/// configuration and tests); `None` selects the default.
pub fn adapter_for(
    provider: Provider,
    credential: Credential,
    base_url: Option<&str>,
) -> Box<dyn ProviderAdapter> {
    match provider {
        Provider::BoldSign => {
            let adapter = match base_url {
                Some(url) => BoldSignAdapter::with_base_url(credential, url.to_string()),
                None => BoldSignAdapter::new(credential),
            };
            Box::new(adapter)
        }
        Provider::JotForm => {
            let adapter = match base_url {
                Some(url) => JotFormAdapter::with_base_url(credential, url.to_string()),
                None => JotFormAdapter::new(credential),
            };
            Box::new(adapter)
        }
    }
}
