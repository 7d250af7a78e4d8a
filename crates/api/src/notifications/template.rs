//! Parametrized transactional email for signature requests.
//!
//! The template takes typed inputs and renders deterministically, so it
//! can be tested (and snapshotted) without touching the email provider.

/// Typed inputs for the signature-request email.
#[derive(Debug, Clone)]
pub struct SignatureEmail<'a> {
    pub recipient_name: &'a str,
    pub document_title: &'a str,
    pub custom_message: Option<&'a str>,
    pub signing_url: &'a str,
}

impl SignatureEmail<'_> {
    /// Subject line.
    pub fn subject(&self) -> String {
        format!("Signature requested: {}", self.document_title)
    }

    /// HTML body. All caller-provided values are escaped.
    pub fn html_body(&self) -> String {
        let mut body = String::new();
        body.push_str("<div style=\"font-family: sans-serif; max-width: 600px;\">\n");
        body.push_str(&format!(
            "  <p>Hello {},</p>\n",
            escape(self.recipient_name)
        ));
        body.push_str(&format!(
            "  <p>You have been asked to sign <strong>{}</strong>.</p>\n",
            escape(self.document_title)
        ));
        if let Some(message) = self.custom_message.filter(|m| !m.trim().is_empty()) {
            body.push_str(&format!("  <p>{}</p>\n", escape(message)));
        }
        body.push_str(&format!(
            "  <p><a href=\"{}\">Review and sign the document</a></p>\n",
            escape(self.signing_url)
        ));
        body.push_str("  <p>If you were not expecting this request, you can ignore this email.</p>\n");
        body.push_str("</div>\n");
        body
    }
}

/// Minimal HTML escaping for text interpolated into the body.
fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
