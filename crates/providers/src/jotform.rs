//! REST client for the JotForm API.
//!
//! Authenticated via an `apiKey` query parameter. JotForm has no
//! server-side signature-request object and no multi-party roles: `send`
//! resolves to the form's public URL (the caller distributes it), and
//! status is derived by listing the form's submissions and inspecting the
//! most recent one. A signed PDF URL is taken from the first file-typed
//! answer field, falling back to the provider's predictable
//! `getSubmissionPDF` URL keyed by submission id.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use caresign_core::signature::{TemplateSummary, DEFAULT_ROLE};

use crate::adapter::{
    DocumentPage, DocumentSummary, ProviderAdapter, ProviderStatus, SendOutcome, SendRequest,
    SigningLink,
};
use crate::credential::Credential;
use crate::error::ProviderError;
use crate::http;

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.jotform.com";

/// HTTP client for the JotForm API, constructed per call from a resolved
/// tenant credential.
pub struct JotFormAdapter {
    client: reqwest::Client,
    base_url: String,
    credential: Credential,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A missing `responseCode` on a 2xx body is treated as success.
fn default_response_code() -> i64 {
    200
}

/// JotForm wraps every response in `{responseCode, message, content}`.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Envelope<T> {
    #[serde(rename = "responseCode", default = "default_response_code")]
    response_code: i64,
    #[serde(default)]
    content: Option<T>,
}

/// A form from `GET /user/forms` or `GET /form/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormRecord {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A submission from `GET /form/{id}/submissions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub answers: Option<HashMap<String, AnswerRecord>>,
}

/// One answer field of a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    #[serde(rename = "type", default)]
    pub answer_type: Option<String>,
    #[serde(default)]
    pub answer: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Pure mapping helpers
// ---------------------------------------------------------------------------

/// The public URL signers open to fill a form.
fn public_form_url(form: &FormRecord) -> String {
    form.url
        .clone()
        .unwrap_or_else(|| format!("https://form.jotform.com/{}", form.id))
}

/// Predictable PDF URL for a submission, used when no file-typed answer
/// carries one.
fn submission_pdf_url(form_id: &str, submission_id: &str) -> String {
    format!(
        "https://www.jotform.com/server.php?action=getSubmissionPDF&formID={form_id}&sid={submission_id}"
    )
}

/// The most recent submission, preferring `created_at` ordering and
/// falling back to list order.
fn latest_submission(submissions: &[SubmissionRecord]) -> Option<&SubmissionRecord> {
    submissions
        .iter()
        .max_by(|a, b| a.created_at.cmp(&b.created_at))
        .or_else(|| submissions.first())
}

/// Extract a document URL from the first file-typed answer field.
fn extract_file_url(answers: &HashMap<String, AnswerRecord>) -> Option<String> {
    let mut file_answers: Vec<(&String, &AnswerRecord)> = answers
        .iter()
        .filter(|(_, answer)| {
            answer
                .answer_type
                .as_deref()
                .is_some_and(|t| t.contains("fileupload") || t.contains("signature"))
        })
        .collect();
    // HashMap iteration order is arbitrary; sort by field key so the
    // extracted URL is deterministic.
    file_answers.sort_by_key(|(key, _)| key.as_str());

    file_answers.into_iter().find_map(|(_, answer)| {
        match answer.answer.as_ref()? {
            serde_json::Value::String(url) if !url.is_empty() => Some(url.clone()),
            serde_json::Value::Array(values) => values.iter().find_map(|v| {
                v.as_str()
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
            }),
            _ => None,
        }
    })
}

/// Parse JotForm's `YYYY-MM-DD HH:MM:SS` submission timestamps.
fn parse_submission_time(raw: &str) -> Option<caresign_core::types::Timestamp> {
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Derive the provider status from a form's submissions: the most recent
/// active/complete submission is terminal; anything else is still pending.
fn submission_status(submissions: &[SubmissionRecord], form_id: &str) -> ProviderStatus {
    let Some(latest) = latest_submission(submissions) else {
        return ProviderStatus::Pending;
    };

    let status = latest.status.as_deref().unwrap_or("");
    if status.eq_ignore_ascii_case("active") || status.eq_ignore_ascii_case("completed") {
        let signed_document_url = latest
            .answers
            .as_ref()
            .and_then(extract_file_url)
            .unwrap_or_else(|| submission_pdf_url(form_id, &latest.id));
        ProviderStatus::Completed {
            signed_document_url: Some(signed_document_url),
            completed_at: latest
                .created_at
                .as_deref()
                .and_then(parse_submission_time),
        }
    } else {
        ProviderStatus::Pending
    }
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

impl JotFormAdapter {
    /// Create an adapter against the production API.
    pub fn new(credential: Credential) -> Self {
        Self::with_base_url(credential, DEFAULT_BASE_URL.to_string())
    }

    /// Create an adapter against a custom base URL.
    pub fn with_base_url(credential: Credential, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            credential,
        }
    }

    /// Unwrap the JotForm response envelope, surfacing a provider-level
    /// rejection embedded in a 2xx body.
    fn unwrap_envelope<T>(envelope: Envelope<T>) -> Result<T, ProviderError> {
        if !(200..300).contains(&envelope.response_code) {
            return Err(ProviderError::Rejected {
                status: envelope.response_code as u16,
                body: "JotForm reported a non-success response code".to_string(),
            });
        }
        envelope.content.ok_or_else(|| {
            ProviderError::InvalidResponse("JotForm response had no content".to_string())
        })
    }

    /// Fetch a single form (`GET /form/{id}`).
    pub async fn get_form(&self, form_id: &str) -> Result<FormRecord, ProviderError> {
        let response = self
            .client
            .get(format!("{}/form/{form_id}", self.base_url))
            .query(&[("apiKey", self.credential.expose())])
            .send()
            .await?;

        let envelope: Envelope<FormRecord> = http::parse_response(response).await?;
        Self::unwrap_envelope(envelope)
    }

    /// Fetch a form's submissions (`GET /form/{id}/submissions`).
    pub async fn list_submissions(
        &self,
        form_id: &str,
    ) -> Result<Vec<SubmissionRecord>, ProviderError> {
        let response = self
            .client
            .get(format!("{}/form/{form_id}/submissions", self.base_url))
            .query(&[("apiKey", self.credential.expose())])
            .send()
            .await?;

        let envelope: Envelope<Vec<SubmissionRecord>> = http::parse_response(response).await?;
        Self::unwrap_envelope(envelope)
    }

    /// Fetch the caller's forms (`GET /user/forms`).
    async fn list_forms(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<FormRecord>, ProviderError> {
        let offset = offset.to_string();
        let limit = limit.to_string();
        let response = self
            .client
            .get(format!("{}/user/forms", self.base_url))
            .query(&[
                ("apiKey", self.credential.expose()),
                ("offset", offset.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let envelope: Envelope<Vec<FormRecord>> = http::parse_response(response).await?;
        Self::unwrap_envelope(envelope)
    }
}

#[async_trait]
impl ProviderAdapter for JotFormAdapter {
    async fn list_templates(&self) -> Result<Vec<TemplateSummary>, ProviderError> {
        let forms = self.list_forms(0, 100).await?;
        Ok(forms
            .into_iter()
            .map(|form| TemplateSummary {
                id: form.id,
                name: form.title.unwrap_or_default(),
                // JotForm has no role concept: always the single default role.
                roles: vec![DEFAULT_ROLE.to_string()],
            })
            .collect())
    }

    async fn send(&self, request: &SendRequest) -> Result<SendOutcome, ProviderError> {
        // There is no provider-side request object to create: resolve the
        // form and hand back its public URL for distribution.
        let form = self.get_form(&request.document_id).await?;
        let url = public_form_url(&form);

        tracing::info!(
            form_id = %form.id,
            "Resolved JotForm signing URL for distribution",
        );

        Ok(SendOutcome {
            external_document_id: form.id,
            signing_links: request
                .signers
                .iter()
                .map(|signer| SigningLink {
                    email: signer.signer_email.clone(),
                    url: url.clone(),
                })
                .collect(),
        })
    }

    async fn get_status(&self, document_id: &str) -> Result<ProviderStatus, ProviderError> {
        let submissions = self.list_submissions(document_id).await?;
        Ok(submission_status(&submissions, document_id))
    }

    async fn list_documents(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<DocumentPage, ProviderError> {
        let offset = (page.max(1) - 1) * page_size;
        let forms = self.list_forms(offset, page_size).await?;
        let documents: Vec<DocumentSummary> = forms
            .into_iter()
            .map(|form| DocumentSummary {
                id: form.id,
                name: form.title.unwrap_or_default(),
                status: form.status.unwrap_or_else(|| "unknown".to_string()),
            })
            .collect();
        // JotForm does not report a reliable total; count what the page
        // window has covered so far.
        let total_count = offset + documents.len() as i64;

        Ok(DocumentPage {
            documents,
            total_count,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn submissions_fixture() -> Vec<SubmissionRecord> {
        serde_json::from_value(serde_json::json!([
            {
                "id": "S2",
                "status": "ACTIVE",
                "created_at": "2026-08-02 10:15:00",
                "answers": {
                    "3": { "type": "control_textbox", "answer": "Jane Doe" },
                    "7": {
                        "type": "control_fileupload",
                        "answer": ["https://www.jotform.com/uploads/S2/signed.pdf"]
                    }
                }
            },
            {
                "id": "S1",
                "status": "ACTIVE",
                "created_at": "2026-08-01 09:00:00",
                "answers": {}
            }
        ]))
        .unwrap()
    }

    #[test]
    fn latest_submission_wins_by_created_at() {
        let submissions = submissions_fixture();
        assert_eq!(latest_submission(&submissions).unwrap().id, "S2");
    }

    #[test]
    fn active_submission_maps_to_completed_with_the_file_answer_url() {
        let status = submission_status(&submissions_fixture(), "F1");
        assert_matches!(status, ProviderStatus::Completed { signed_document_url: Some(url), completed_at: Some(_) } => {
            assert_eq!(url, "https://www.jotform.com/uploads/S2/signed.pdf");
        });
    }

    #[test]
    fn missing_file_answer_falls_back_to_the_pdf_url_pattern() {
        let submissions: Vec<SubmissionRecord> = serde_json::from_value(serde_json::json!([
            { "id": "S9", "status": "ACTIVE", "created_at": "2026-08-02 10:15:00", "answers": {} }
        ]))
        .unwrap();

        let status = submission_status(&submissions, "F1");
        assert_matches!(status, ProviderStatus::Completed { signed_document_url: Some(url), .. } => {
            assert_eq!(
                url,
                "https://www.jotform.com/server.php?action=getSubmissionPDF&formID=F1&sid=S9"
            );
        });
    }

    #[test]
    fn no_submissions_means_still_pending() {
        assert_eq!(submission_status(&[], "F1"), ProviderStatus::Pending);
    }

    #[test]
    fn non_active_submissions_stay_pending() {
        let submissions: Vec<SubmissionRecord> = serde_json::from_value(serde_json::json!([
            { "id": "S1", "status": "DELETED", "created_at": "2026-08-01 09:00:00" }
        ]))
        .unwrap();
        assert_eq!(submission_status(&submissions, "F1"), ProviderStatus::Pending);
    }

    #[test]
    fn form_url_falls_back_to_the_public_pattern() {
        let form = FormRecord {
            id: "F1".to_string(),
            title: None,
            url: None,
            status: None,
        };
        assert_eq!(public_form_url(&form), "https://form.jotform.com/F1");
    }

    #[test]
    fn signature_answers_also_count_as_file_output() {
        let answers: HashMap<String, AnswerRecord> = serde_json::from_value(serde_json::json!({
            "5": { "type": "control_signature", "answer": "https://www.jotform.com/uploads/sig.png" }
        }))
        .unwrap();
        assert_eq!(
            extract_file_url(&answers).as_deref(),
            Some("https://www.jotform.com/uploads/sig.png")
        );
    }
}
