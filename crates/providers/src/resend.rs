//! REST client for the Resend transactional email API.
//!
//! Authenticated via a bearer token. Sending is not idempotent and is
//! never retried automatically; the notification dispatcher records the
//! per-recipient outcome instead.

use serde::{Deserialize, Serialize};

use crate::credential::Credential;
use crate::error::ProviderError;
use crate::http;

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.resend.com";

/// Input for a single transactional email send.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Response from `POST /emails`.
#[derive(Debug, Deserialize)]
struct EmailResponse {
    id: String,
}

/// HTTP client for the Resend API, constructed per call from a resolved
/// tenant credential.
pub struct ResendClient {
    client: reqwest::Client,
    base_url: String,
    credential: Credential,
}

impl ResendClient {
    /// Create a client against the production API.
    pub fn new(credential: Credential) -> Self {
        Self::with_base_url(credential, DEFAULT_BASE_URL.to_string())
    }

    /// Create a client against a custom base URL.
    pub fn with_base_url(credential: Credential, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            credential,
        }
    }

    /// Send one email, returning the provider-assigned message id.
    pub async fn send_email(&self, email: &OutgoingEmail) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "from": email.from,
            "to": [email.to],
            "subject": email.subject,
            "html": email.html,
        });
        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(self.credential.expose())
            .json(&body)
            .send()
            .await?;

        let sent: EmailResponse = http::parse_response(response).await?;
        Ok(sent.id)
    }
}
