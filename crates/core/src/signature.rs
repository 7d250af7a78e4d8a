//! Signature request lifecycle: provider and status enums, the legal
//! status-transition graph, and request-level validation rules shared by
//! the store and the API layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// External e-signature provider a request is dispatched through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    BoldSign,
    JotForm,
}

impl Provider {
    /// The stored/wire representation of this provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::BoldSign => "boldsign",
            Provider::JotForm => "jotform",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boldsign" => Ok(Provider::BoldSign),
            "jotform" => Ok(Provider::JotForm),
            other => Err(CoreError::Validation(format!(
                "Unknown provider '{other}'. Must be one of: boldsign, jotform"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Request status
// ---------------------------------------------------------------------------

/// Lifecycle status of a signature request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Draft,
    Sent,
    Viewed,
    Signed,
    Completed,
    Declined,
    Expired,
}

impl RequestStatus {
    /// The stored/wire representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Draft => "draft",
            RequestStatus::Sent => "sent",
            RequestStatus::Viewed => "viewed",
            RequestStatus::Signed => "signed",
            RequestStatus::Completed => "completed",
            RequestStatus::Declined => "declined",
            RequestStatus::Expired => "expired",
        }
    }

    /// True once no further transition is legal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStatus::Signed
                | RequestStatus::Completed
                | RequestStatus::Declined
                | RequestStatus::Expired
        )
    }

    /// Returns the set of statuses this status may transition to.
    ///
    /// Transition rules:
    /// - `draft`  -> `sent` (successful provider dispatch)
    /// - `sent`   -> `viewed`, `signed`, `completed`, `declined`, `expired`
    /// - `viewed` -> `signed`, `completed`, `declined`, `expired`
    /// - `signed`, `completed`, `declined`, `expired` are terminal.
    pub fn valid_transitions(&self) -> &'static [RequestStatus] {
        match self {
            RequestStatus::Draft => &[RequestStatus::Sent],
            RequestStatus::Sent => &[
                RequestStatus::Viewed,
                RequestStatus::Signed,
                RequestStatus::Completed,
                RequestStatus::Declined,
                RequestStatus::Expired,
            ],
            RequestStatus::Viewed => &[
                RequestStatus::Signed,
                RequestStatus::Completed,
                RequestStatus::Declined,
                RequestStatus::Expired,
            ],
            _ => &[],
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(RequestStatus::Draft),
            "sent" => Ok(RequestStatus::Sent),
            "viewed" => Ok(RequestStatus::Viewed),
            "signed" => Ok(RequestStatus::Signed),
            "completed" => Ok(RequestStatus::Completed),
            "declined" => Ok(RequestStatus::Declined),
            "expired" => Ok(RequestStatus::Expired),
            other => Err(CoreError::Validation(format!(
                "Unknown signature request status '{other}'"
            ))),
        }
    }
}

/// Validate that a status transition from `current` to `next` is allowed.
///
/// A same-status write is treated as a no-op and accepted so that repeated
/// sync invocations stay idempotent.
pub fn validate_transition(current: RequestStatus, next: RequestStatus) -> Result<(), CoreError> {
    if current == next {
        return Ok(());
    }
    let allowed = current.valid_transitions();
    if allowed.contains(&next) {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Cannot transition signature request from '{current}' to '{next}'. \
             Allowed transitions: {allowed:?}"
        )))
    }
}

/// Statuses a client may supply when creating a request.
///
/// Creation can only legally produce `draft` (dispatch deferred) or `sent`
/// (dispatch succeeded synchronously); anything else must come through the
/// guarded update path.
pub fn validate_initial_status(status: RequestStatus) -> Result<(), CoreError> {
    match status {
        RequestStatus::Draft | RequestStatus::Sent => Ok(()),
        other => Err(CoreError::Validation(format!(
            "A signature request cannot be created with status '{other}'. \
             Only 'draft' or 'sent' are accepted"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Recipients / templates
// ---------------------------------------------------------------------------

/// Default role label for providers without a role concept.
pub const DEFAULT_ROLE: &str = "Signer";

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

/// A single signer on a signature request.
///
/// Serialized into the `recipients` JSONB column in order; the list is
/// never empty on a persisted request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Recipient {
    #[validate(length(min = 1, message = "Recipient name is required"))]
    pub name: String,
    #[validate(email(message = "Recipient email is not a valid address"))]
    pub email: String,
    /// Provider-defined role label (e.g. "Patient", "Nurse_Practitioner").
    #[serde(default = "default_role")]
    pub role: String,
}

/// Provider-neutral summary of a reusable template (or JotForm form).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSummary {
    /// Provider-side identifier used to send from this template.
    pub id: String,
    pub name: String,
    /// Ordered signer role names declared by the template. A single
    /// synthetic "Signer" entry for providers without a role concept.
    pub roles: Vec<String>,
}

/// Validate the recipient list of a new request: non-empty, every entry
/// well-formed. Runs before any network call.
pub fn validate_recipients(recipients: &[Recipient]) -> Result<(), CoreError> {
    if recipients.is_empty() {
        return Err(CoreError::Validation(
            "At least one recipient is required".to_string(),
        ));
    }
    for recipient in recipients {
        recipient.validate().map_err(|err| {
            CoreError::Validation(format!("Invalid recipient '{}': {err}", recipient.email))
        })?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            RequestStatus::Draft,
            RequestStatus::Sent,
            RequestStatus::Viewed,
            RequestStatus::Signed,
            RequestStatus::Completed,
            RequestStatus::Declined,
            RequestStatus::Expired,
        ] {
            assert_eq!(status.as_str().parse::<RequestStatus>().unwrap(), status);
        }
        assert!("bogus".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn provider_round_trips_through_strings() {
        assert_eq!("boldsign".parse::<Provider>().unwrap(), Provider::BoldSign);
        assert_eq!("jotform".parse::<Provider>().unwrap(), Provider::JotForm);
        assert!("docusign".parse::<Provider>().is_err());
    }

    #[test]
    fn draft_can_only_transition_to_sent() {
        assert!(validate_transition(RequestStatus::Draft, RequestStatus::Sent).is_ok());
        assert!(validate_transition(RequestStatus::Draft, RequestStatus::Completed).is_err());
        assert!(validate_transition(RequestStatus::Draft, RequestStatus::Declined).is_err());
    }

    #[test]
    fn sent_can_reach_every_later_status() {
        for next in [
            RequestStatus::Viewed,
            RequestStatus::Signed,
            RequestStatus::Completed,
            RequestStatus::Declined,
            RequestStatus::Expired,
        ] {
            assert!(validate_transition(RequestStatus::Sent, next).is_ok());
        }
        assert!(validate_transition(RequestStatus::Sent, RequestStatus::Draft).is_err());
    }

    #[test]
    fn terminal_statuses_accept_no_transitions() {
        for terminal in [
            RequestStatus::Signed,
            RequestStatus::Completed,
            RequestStatus::Declined,
            RequestStatus::Expired,
        ] {
            assert!(terminal.is_terminal());
            assert!(validate_transition(terminal, RequestStatus::Sent).is_err());
        }
    }

    #[test]
    fn same_status_write_is_a_noop() {
        assert!(validate_transition(RequestStatus::Completed, RequestStatus::Completed).is_ok());
    }

    #[test]
    fn initial_status_is_draft_or_sent_only() {
        assert!(validate_initial_status(RequestStatus::Draft).is_ok());
        assert!(validate_initial_status(RequestStatus::Sent).is_ok());
        assert!(validate_initial_status(RequestStatus::Completed).is_err());
        assert!(validate_initial_status(RequestStatus::Declined).is_err());
    }

    #[test]
    fn empty_recipient_list_is_rejected() {
        assert!(validate_recipients(&[]).is_err());
    }

    #[test]
    fn malformed_recipient_email_is_rejected() {
        let recipients = vec![Recipient {
            name: "Jane Doe".to_string(),
            email: "not-an-email".to_string(),
            role: DEFAULT_ROLE.to_string(),
        }];
        assert!(validate_recipients(&recipients).is_err());
    }

    #[test]
    fn recipient_role_defaults_to_signer() {
        let recipient: Recipient =
            serde_json::from_str(r#"{"name": "Jane Doe", "email": "jane@x.com"}"#).unwrap();
        assert_eq!(recipient.role, DEFAULT_ROLE);
    }
}
