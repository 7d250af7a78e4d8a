//! Error taxonomy shared by all outbound service clients.

/// Errors from the e-signature and email provider clients.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No API credential could be resolved from tenant or process
    /// configuration. Surfaced to the user as-is rather than as a generic
    /// failure.
    #[error("{provider} is not configured: set the tenant '{key}' setting or the matching environment variable")]
    ConfigurationMissing {
        provider: &'static str,
        key: &'static str,
    },

    /// The provider returned a non-2xx status code.
    #[error("Provider rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// BoldSign reported the target as a completed document rather than a
    /// reusable template, and the direct document send also failed.
    #[error("'{document_id}' is not a reusable template: {hint}")]
    NotAReusableTemplate { document_id: String, hint: String },

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The call did not complete within the configured deadline.
    #[error("Provider call timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The provider answered 2xx but the body did not have the expected
    /// shape.
    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// True for failures worth retrying on idempotent calls: transport
    /// errors, timeouts, and provider-side 5xx responses.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Network(_) | ProviderError::Timeout { .. } => true,
            ProviderError::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
