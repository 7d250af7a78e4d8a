//! REST client for the BoldSign e-signature API.
//!
//! Authenticated via an `X-API-KEY` header. Templates declare a fixed,
//! ordered list of signer roles; `send` assigns caller signers
//! positionally and fills any remaining roles with the synthetic
//! placeholder signer. Sending against an id that turns out to be a
//! completed document (not a reusable template) falls back to a direct
//! document send before giving up with
//! [`ProviderError::NotAReusableTemplate`].

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;

use caresign_core::signature::{TemplateSummary, DEFAULT_ROLE};
use caresign_core::roles::SignerRole;

use crate::adapter::{
    DocumentPage, DocumentSummary, ProviderAdapter, ProviderStatus, SendOutcome, SendRequest,
};
use crate::credential::Credential;
use crate::error::ProviderError;
use crate::http;

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.boldsign.com";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "X-API-KEY";

/// HTTP client for the BoldSign API, constructed per call from a resolved
/// tenant credential.
pub struct BoldSignAdapter {
    client: reqwest::Client,
    base_url: String,
    credential: Credential,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One entry from `GET /v1/template/list`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemplateRecord {
    document_id: String,
    #[serde(default)]
    template_name: Option<String>,
    #[serde(default)]
    roles: Vec<RoleRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleRecord {
    #[serde(default)]
    role_name: Option<String>,
    #[serde(default)]
    role_index: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemplateListResponse {
    #[serde(default)]
    result: Vec<TemplateRecord>,
}

/// Response from the template/document send endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    document_id: String,
}

/// One document from `GET /v1/document/{id}` or `GET /v1/document/list`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentRecord {
    document_id: String,
    #[serde(default)]
    message_title: Option<String>,
    #[serde(default)]
    status: Option<String>,
    /// Completion time as unix epoch seconds.
    #[serde(default)]
    completed_date: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentListResponse {
    #[serde(default)]
    result: Vec<DocumentRecord>,
    #[serde(default)]
    page_details: Option<PageDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageDetails {
    #[serde(default)]
    total_records: Option<i64>,
}

// ---------------------------------------------------------------------------
// Pure mapping helpers
// ---------------------------------------------------------------------------

/// Build the ordered role payload for a send. Roles are numbered 1..N in
/// signer order; the role resolver has already injected the synthetic
/// placeholder for any unfilled tail roles.
fn role_payload(signers: &[SignerRole]) -> Vec<serde_json::Value> {
    signers
        .iter()
        .enumerate()
        .map(|(index, signer)| {
            serde_json::json!({
                "roleIndex": index + 1,
                "signerName": signer.signer_name,
                "signerEmail": signer.signer_email,
                "signerRole": signer.role_name,
                "signerType": "Signer",
            })
        })
        .collect()
}

/// Map a template record onto the provider-neutral summary, ordering the
/// declared roles by their role index.
fn template_summary(record: TemplateRecord) -> TemplateSummary {
    let mut roles = record.roles;
    roles.sort_by_key(|r| r.role_index.unwrap_or(i64::MAX));
    let roles = roles
        .into_iter()
        .enumerate()
        .map(|(index, role)| {
            role.role_name
                .unwrap_or_else(|| format!("{DEFAULT_ROLE} {}", index + 1))
        })
        .collect();
    TemplateSummary {
        id: record.document_id,
        name: record.template_name.unwrap_or_default(),
        roles,
    }
}

/// Map a document record onto the externally reported status.
fn map_document_status(base_url: &str, record: &DocumentRecord) -> ProviderStatus {
    let status = record.status.as_deref().unwrap_or("");
    if status.eq_ignore_ascii_case("completed") || status.eq_ignore_ascii_case("signed") {
        ProviderStatus::Completed {
            signed_document_url: Some(format!(
                "{base_url}/v1/document/download?documentId={}",
                record.document_id
            )),
            completed_at: record
                .completed_date
                .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0)),
        }
    } else if status.eq_ignore_ascii_case("declined") || status.eq_ignore_ascii_case("revoked") {
        ProviderStatus::Declined
    } else if status.eq_ignore_ascii_case("expired") {
        ProviderStatus::Expired
    } else {
        ProviderStatus::Pending
    }
}

/// Rejection-body fragments that identify the send target as a completed
/// document rather than a reusable template.
const COMPLETED_DOCUMENT_MARKERS: &[&str] =
    &["not a template", "completed document", "template not found"];

/// Classify a template-send failure: does it indicate the target is a
/// completed document, warranting the document-send fallback?
fn is_completed_document_rejection(err: &ProviderError) -> bool {
    match err {
        ProviderError::Rejected { status, body } if (400..500).contains(status) => {
            let body = body.to_lowercase();
            COMPLETED_DOCUMENT_MARKERS
                .iter()
                .any(|marker| body.contains(marker))
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Send cascade
// ---------------------------------------------------------------------------

/// Run an ordered list of named send strategies.
///
/// Short-circuits on the first success. A failure of a non-final strategy
/// falls through to the next one only when `fall_through` classifies it as
/// fallback-worthy; otherwise it surfaces directly. When a fallback chain
/// was entered and the final strategy also fails, the aggregated failure
/// reasons are raised as [`ProviderError::NotAReusableTemplate`].
async fn run_send_cascade(
    document_id: &str,
    strategies: Vec<(&'static str, BoxFuture<'_, Result<SendOutcome, ProviderError>>)>,
    fall_through: impl Fn(&ProviderError) -> bool,
) -> Result<SendOutcome, ProviderError> {
    let total = strategies.len();
    let mut failures: Vec<String> = Vec::new();

    for (index, (name, attempt)) in strategies.into_iter().enumerate() {
        match attempt.await {
            Ok(outcome) => return Ok(outcome),
            Err(err) => {
                let last = index + 1 == total;
                if !last && fall_through(&err) {
                    tracing::warn!(
                        strategy = name,
                        document_id,
                        error = %err,
                        "Send strategy failed; falling through to next",
                    );
                    failures.push(format!("{name}: {err}"));
                    continue;
                }
                if failures.is_empty() {
                    // The first strategy failed for a reason that does not
                    // warrant a fallback; surface it as-is.
                    return Err(err);
                }
                failures.push(format!("{name}: {err}"));
                return Err(ProviderError::NotAReusableTemplate {
                    document_id: document_id.to_string(),
                    hint: format!(
                        "{}; create a reusable template from this document in BoldSign and \
                         resend with the new template id",
                        failures.join("; ")
                    ),
                });
            }
        }
    }

    Err(ProviderError::InvalidResponse(
        "No send strategies were configured".to_string(),
    ))
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

impl BoldSignAdapter {
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

    /// Attempt a template-based send (`POST /v1/template/send`).
    async fn send_via_template(
        &self,
        request: &SendRequest,
    ) -> Result<SendOutcome, ProviderError> {
        let body = serde_json::json!({
            "title": request.title,
            "message": request.message,
            "roles": role_payload(&request.signers),
        });
        let response = self
            .client
            .post(format!("{}/v1/template/send", self.base_url))
            .query(&[("templateId", request.document_id.as_str())])
            .header(API_KEY_HEADER, self.credential.expose())
            .json(&body)
            .send()
            .await?;

        let sent: SendResponse = http::parse_response(response).await?;
        Ok(SendOutcome {
            external_document_id: sent.document_id,
            signing_links: Vec::new(),
        })
    }

    /// Attempt a direct document-based send (`POST /v1/document/send`).
    async fn send_via_document(
        &self,
        request: &SendRequest,
    ) -> Result<SendOutcome, ProviderError> {
        let body = serde_json::json!({
            "title": request.title,
            "message": request.message,
            "roles": role_payload(&request.signers),
        });
        let response = self
            .client
            .post(format!("{}/v1/document/send", self.base_url))
            .query(&[("documentId", request.document_id.as_str())])
            .header(API_KEY_HEADER, self.credential.expose())
            .json(&body)
            .send()
            .await?;

        let sent: SendResponse = http::parse_response(response).await?;
        Ok(SendOutcome {
            external_document_id: sent.document_id,
            signing_links: Vec::new(),
        })
    }
}

#[async_trait]
impl ProviderAdapter for BoldSignAdapter {
    async fn list_templates(&self) -> Result<Vec<TemplateSummary>, ProviderError> {
        let response = self
            .client
            .get(format!("{}/v1/template/list", self.base_url))
            .header(API_KEY_HEADER, self.credential.expose())
            .send()
            .await?;

        let list: TemplateListResponse = http::parse_response(response).await?;
        Ok(list.result.into_iter().map(template_summary).collect())
    }

    async fn send(&self, request: &SendRequest) -> Result<SendOutcome, ProviderError> {
        let strategies: Vec<(&'static str, BoxFuture<'_, _>)> = vec![
            ("template-send", self.send_via_template(request).boxed()),
            ("document-send", self.send_via_document(request).boxed()),
        ];
        run_send_cascade(&request.document_id, strategies, is_completed_document_rejection)
            .await
    }

    async fn get_status(&self, document_id: &str) -> Result<ProviderStatus, ProviderError> {
        let response = self
            .client
            .get(format!("{}/v1/document/{document_id}", self.base_url))
            .header(API_KEY_HEADER, self.credential.expose())
            .send()
            .await?;

        let record: DocumentRecord = http::parse_response(response).await?;
        Ok(map_document_status(&self.base_url, &record))
    }

    async fn list_documents(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<DocumentPage, ProviderError> {
        let response = self
            .client
            .get(format!("{}/v1/document/list", self.base_url))
            .query(&[("page", page), ("pageSize", page_size)])
            .header(API_KEY_HEADER, self.credential.expose())
            .send()
            .await?;

        let list: DocumentListResponse = http::parse_response(response).await?;
        let total_count = list
            .page_details
            .and_then(|d| d.total_records)
            .unwrap_or(list.result.len() as i64);
        let documents = list
            .result
            .into_iter()
            .map(|record| DocumentSummary {
                id: record.document_id,
                name: record.message_title.unwrap_or_default(),
                status: record.status.unwrap_or_else(|| "unknown".to_string()),
            })
            .collect();

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
    use futures::future;

    use caresign_core::roles::{self, SignerInput, PLACEHOLDER_EMAIL};

    use super::*;

    fn outcome(id: &str) -> SendOutcome {
        SendOutcome {
            external_document_id: id.to_string(),
            signing_links: Vec::new(),
        }
    }

    fn completed_document_rejection() -> ProviderError {
        ProviderError::Rejected {
            status: 400,
            body: "The selected id refers to a completed document".to_string(),
        }
    }

    #[test]
    fn one_signer_against_two_roles_fills_the_second_with_the_placeholder() {
        let declared = vec!["Patient".to_string(), "Nurse_Practitioner".to_string()];
        let signers = vec![SignerInput {
            name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
        }];
        let resolved = roles::resolve(&declared, &signers).unwrap();

        let payload = role_payload(&resolved);
        assert_eq!(payload.len(), 2);
        assert_eq!(payload[0]["roleIndex"], 1);
        assert_eq!(payload[0]["signerEmail"], "jane@x.com");
        assert_eq!(payload[1]["roleIndex"], 2);
        assert_eq!(payload[1]["signerEmail"], PLACEHOLDER_EMAIL);
    }

    #[test]
    fn completed_document_bodies_are_classified_for_fallback() {
        assert!(is_completed_document_rejection(&completed_document_rejection()));
        assert!(is_completed_document_rejection(&ProviderError::Rejected {
            status: 404,
            body: "Template not found for the given id".to_string(),
        }));
        assert!(!is_completed_document_rejection(&ProviderError::Rejected {
            status: 401,
            body: "Invalid API key".to_string(),
        }));
        assert!(!is_completed_document_rejection(&ProviderError::Rejected {
            status: 500,
            body: "completed document".to_string(),
        }));
        assert!(!is_completed_document_rejection(&ProviderError::Timeout {
            seconds: 30
        }));
    }

    #[tokio::test]
    async fn cascade_short_circuits_on_first_success() {
        let result = run_send_cascade(
            "T1",
            vec![
                ("template-send", future::ready(Ok(outcome("D1"))).boxed()),
                (
                    "document-send",
                    future::ready(Err(ProviderError::Timeout { seconds: 1 })).boxed(),
                ),
            ],
            is_completed_document_rejection,
        )
        .await;

        assert_eq!(result.unwrap().external_document_id, "D1");
    }

    #[tokio::test]
    async fn cascade_falls_through_on_completed_document_rejection() {
        let result = run_send_cascade(
            "T1",
            vec![
                (
                    "template-send",
                    future::ready(Err(completed_document_rejection())).boxed(),
                ),
                ("document-send", future::ready(Ok(outcome("D2"))).boxed()),
            ],
            is_completed_document_rejection,
        )
        .await;

        assert_eq!(result.unwrap().external_document_id, "D2");
    }

    #[tokio::test]
    async fn exhausted_cascade_raises_not_a_reusable_template() {
        let result = run_send_cascade(
            "DOC42",
            vec![
                (
                    "template-send",
                    future::ready(Err(completed_document_rejection())).boxed(),
                ),
                (
                    "document-send",
                    future::ready(Err(ProviderError::Rejected {
                        status: 400,
                        body: "document already finalized".to_string(),
                    }))
                    .boxed(),
                ),
            ],
            is_completed_document_rejection,
        )
        .await;

        assert_matches!(
            result,
            Err(ProviderError::NotAReusableTemplate { document_id, hint }) => {
                assert_eq!(document_id, "DOC42");
                assert!(hint.contains("template-send"));
                assert!(hint.contains("document-send"));
            }
        );
    }

    #[tokio::test]
    async fn unrelated_first_failure_surfaces_directly() {
        let result = run_send_cascade(
            "T1",
            vec![
                (
                    "template-send",
                    future::ready(Err(ProviderError::Rejected {
                        status: 401,
                        body: "Invalid API key".to_string(),
                    }))
                    .boxed(),
                ),
                ("document-send", future::ready(Ok(outcome("D2"))).boxed()),
            ],
            is_completed_document_rejection,
        )
        .await;

        assert_matches!(result, Err(ProviderError::Rejected { status: 401, .. }));
    }

    #[test]
    fn template_roles_are_ordered_by_role_index() {
        let record = TemplateRecord {
            document_id: "T1".to_string(),
            template_name: Some("Intake".to_string()),
            roles: vec![
                RoleRecord {
                    role_name: Some("Nurse_Practitioner".to_string()),
                    role_index: Some(2),
                },
                RoleRecord {
                    role_name: Some("Patient".to_string()),
                    role_index: Some(1),
                },
            ],
        };

        let summary = template_summary(record);
        assert_eq!(summary.roles, vec!["Patient", "Nurse_Practitioner"]);
    }

    #[test]
    fn completed_documents_map_to_a_download_url() {
        let record = DocumentRecord {
            document_id: "D1".to_string(),
            message_title: None,
            status: Some("Completed".to_string()),
            completed_date: Some(1_700_000_000),
        };

        let status = map_document_status(DEFAULT_BASE_URL, &record);
        assert_matches!(status, ProviderStatus::Completed { signed_document_url: Some(url), completed_at: Some(_) } => {
            assert!(url.contains("documentId=D1"));
        });
    }

    #[test]
    fn in_progress_documents_map_to_pending() {
        let record = DocumentRecord {
            document_id: "D1".to_string(),
            message_title: None,
            status: Some("InProgress".to_string()),
            completed_date: None,
        };
        assert_eq!(
            map_document_status(DEFAULT_BASE_URL, &record),
            ProviderStatus::Pending
        );
    }
}
