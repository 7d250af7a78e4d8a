//! Signer role resolution.
//!
//! Maps caller-supplied signers onto the ordered role list a template
//! declares. BoldSign templates require every declared role to be filled,
//! so missing tail roles receive a fixed synthetic placeholder signer;
//! JotForm has no role concept and always resolves to a single "Signer".

use serde::{Deserialize, Serialize};

use crate::signature::DEFAULT_ROLE;

/// Name of the synthetic placeholder signer.
pub const PLACEHOLDER_NAME: &str = "CareSign Placeholder";

/// Email of the synthetic placeholder signer.
pub const PLACEHOLDER_EMAIL: &str = "placeholder@caresign.invalid";

/// Caller-supplied signer details before role assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignerInput {
    pub name: String,
    pub email: String,
}

/// A resolved assignment of one signer to one template role.
///
/// Becomes part of a request's `recipients` on submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignerRole {
    pub role_name: String,
    pub signer_name: String,
    pub signer_email: String,
}

impl SignerRole {
    /// True when this role is filled by the synthetic placeholder signer.
    pub fn is_placeholder(&self) -> bool {
        self.signer_email == PLACEHOLDER_EMAIL
    }

    /// True when both name and email have been entered.
    pub fn is_filled(&self) -> bool {
        !self.signer_name.trim().is_empty() && !self.signer_email.trim().is_empty()
    }
}

/// Error raised when supplied signers cannot be assigned to declared roles.
#[derive(Debug, thiserror::Error)]
pub enum RoleError {
    #[error("Template declares {required} signer role(s) but {supplied} were supplied")]
    TooManySigners { required: usize, supplied: usize },
}

/// Positionally assign signers to declared roles.
///
/// Signers fill roles 1..N in order. Fewer signers than roles injects the
/// synthetic placeholder for the remaining roles; more signers than roles
/// is a [`RoleError::TooManySigners`].
pub fn resolve(
    declared_roles: &[String],
    signers: &[SignerInput],
) -> Result<Vec<SignerRole>, RoleError> {
    if signers.len() > declared_roles.len() {
        return Err(RoleError::TooManySigners {
            required: declared_roles.len(),
            supplied: signers.len(),
        });
    }

    Ok(declared_roles
        .iter()
        .enumerate()
        .map(|(index, role_name)| match signers.get(index) {
            Some(signer) => SignerRole {
                role_name: role_name.clone(),
                signer_name: signer.name.clone(),
                signer_email: signer.email.clone(),
            },
            None => SignerRole {
                role_name: role_name.clone(),
                signer_name: PLACEHOLDER_NAME.to_string(),
                signer_email: PLACEHOLDER_EMAIL.to_string(),
            },
        })
        .collect())
}

/// The JotForm default: exactly one synthetic "Signer" role.
pub fn single_signer_role(signer: &SignerInput) -> Vec<SignerRole> {
    vec![SignerRole {
        role_name: DEFAULT_ROLE.to_string(),
        signer_name: signer.name.clone(),
        signer_email: signer.email.clone(),
    }]
}

/// Merge a fresh resolution with previously entered signer details.
///
/// For every role name that also existed in `previous` with user-entered
/// (non-placeholder) details, those details win over the fresh assignment.
pub fn merge_preserving(previous: &[SignerRole], resolved: Vec<SignerRole>) -> Vec<SignerRole> {
    resolved
        .into_iter()
        .map(|mut role| {
            let typed = previous
                .iter()
                .find(|p| p.role_name == role.role_name && p.is_filled() && !p.is_placeholder());
            if let Some(previous_role) = typed {
                role.signer_name = previous_role.signer_name.clone();
                role.signer_email = previous_role.signer_email.clone();
            }
            role
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
