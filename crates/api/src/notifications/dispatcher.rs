//! Per-recipient email dispatch for newly created signature requests.
//!
//! Delivery is sequential and the returned outcomes preserve recipient
//! ordering, so the caller can show partial-failure status ("2 of 3
//! emails delivered"). A failed email never rolls back the already
//! created request.

use serde::Serialize;

use caresign_db::models::signature_request::SignatureRequest;
use caresign_providers::resend::{OutgoingEmail, ResendClient};

use crate::notifications::template::SignatureEmail;

/// A configured mailer: the Resend client plus the sender identity.
pub struct Mailer {
    pub client: ResendClient,
    pub from: String,
}

/// Per-recipient delivery result, in dispatch order.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryOutcome {
    pub email: String,
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Dispatch one email per recipient of a request that carries a
/// direct-access URL.
///
/// Requests without a signing URL produce no outcomes (the provider
/// notifies signers itself). When no mailer is configured the outcomes
/// record the skip instead of failing the request.
pub async fn dispatch(mailer: Option<&Mailer>, request: &SignatureRequest) -> Vec<DeliveryOutcome> {
    let Some(signing_url) = request.signature_url.as_deref() else {
        return Vec::new();
    };

    let recipients = match request.recipient_list() {
        Ok(recipients) => recipients,
        Err(err) => {
            tracing::error!(request_id = request.id, error = %err, "Skipping notification dispatch");
            return Vec::new();
        }
    };

    let mut outcomes = Vec::with_capacity(recipients.len());
    for recipient in &recipients {
        let outcome = match mailer {
            None => DeliveryOutcome {
                email: recipient.email.clone(),
                sent: false,
                error: Some("Email delivery is not configured".to_string()),
            },
            Some(mailer) => {
                let template = SignatureEmail {
                    recipient_name: &recipient.name,
                    document_title: &request.title,
                    custom_message: request.custom_message.as_deref(),
                    signing_url,
                };
                let email = OutgoingEmail {
                    from: mailer.from.clone(),
                    to: recipient.email.clone(),
                    subject: template.subject(),
                    html: template.html_body(),
                };
                match mailer.client.send_email(&email).await {
                    Ok(message_id) => {
                        tracing::info!(
                            request_id = request.id,
                            to = %recipient.email,
                            message_id = %message_id,
                            "Signature request email sent",
                        );
                        DeliveryOutcome {
                            email: recipient.email.clone(),
                            sent: true,
                            error: None,
                        }
                    }
                    Err(err) => {
                        tracing::warn!(
                            request_id = request.id,
                            to = %recipient.email,
                            error = %err,
                            "Signature request email failed",
                        );
                        DeliveryOutcome {
                            email: recipient.email.clone(),
                            sent: false,
                            error: Some(err.to_string()),
                        }
                    }
                }
            }
        };
        outcomes.push(outcome);
    }
    outcomes
}
