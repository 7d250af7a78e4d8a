//! Per-call provider credentials.

use std::fmt;

/// An API credential resolved from tenant or process configuration.
///
/// Constructed fresh for every provider call so a credential rotation
/// takes effect immediately; never held in a module-level client. The
/// secret is redacted from `Debug` output.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret, for request authentication.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
