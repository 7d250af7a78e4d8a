//! Request composition state machine.
//!
//! Drives the multi-step flow behind a new signature request: provider
//! selection, template loading (cached per provider for the life of the
//! session), document selection, role resolution, signer detail entry,
//! and pre-submission validation. The machine is pure state; the API
//! engine performs the surrounding network calls.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::CoreError;
use crate::roles::{self, RoleError, SignerInput, SignerRole};
use crate::signature::{Provider, TemplateSummary};

/// A field-scoped validation failure, surfaced before any network call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The step the composition flow is currently on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    SelectProvider,
    LoadTemplates,
    SelectDocument,
    ResolveRoles,
    FillSignerDetails,
    Submit,
}

/// A fully validated submission, ready for provider dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub document_id: String,
    pub title: String,
    pub message: String,
    pub signers: Vec<SignerRole>,
}

/// Pure composition state for one signing session.
#[derive(Debug, Default)]
pub struct Composer {
    provider: Option<Provider>,
    template_cache: HashMap<Provider, Vec<TemplateSummary>>,
    selected_document: Option<String>,
    signer_roles: Vec<SignerRole>,
    pub title: String,
    pub custom_message: String,
}

impl Composer {
    /// The currently selected provider, if any.
    pub fn provider(&self) -> Option<Provider> {
        self.provider
    }

    /// The currently selected document/form id, if any.
    pub fn selected_document(&self) -> Option<&str> {
        self.selected_document.as_deref()
    }

    /// The resolved role assignments (empty before `resolve_roles`).
    pub fn signer_roles(&self) -> &[SignerRole] {
        &self.signer_roles
    }

    /// Derive the current step from the accumulated state.
    pub fn step(&self) -> Step {
        let Some(provider) = self.provider else {
            return Step::SelectProvider;
        };
        if !self.template_cache.contains_key(&provider) {
            return Step::LoadTemplates;
        }
        if self.selected_document.is_none() {
            return Step::SelectDocument;
        }
        if self.signer_roles.is_empty() {
            return Step::ResolveRoles;
        }
        if self.validate().is_err() {
            return Step::FillSignerDetails;
        }
        Step::Submit
    }

    /// Select (or switch) the provider.
    ///
    /// Resets the document selection and resolved roles; previously entered
    /// signer details are retained so a later `resolve_roles` can preserve
    /// them for overlapping role names. Returns `true` when this provider's
    /// template list is not yet cached and must be loaded.
    pub fn select_provider(&mut self, provider: Provider) -> bool {
        self.provider = Some(provider);
        self.selected_document = None;
        !self.template_cache.contains_key(&provider)
    }

    /// Store a freshly loaded template list for `provider`.
    pub fn templates_loaded(&mut self, provider: Provider, templates: Vec<TemplateSummary>) {
        self.template_cache.insert(provider, templates);
    }

    /// The cached template list for `provider`, if loaded this session.
    pub fn templates(&self, provider: Provider) -> Option<&[TemplateSummary]> {
        self.template_cache.get(&provider).map(Vec::as_slice)
    }

    /// Select a document/form from the cached template list.
    pub fn select_document(&mut self, document_id: &str) -> Result<&TemplateSummary, CoreError> {
        let provider = self.provider.ok_or_else(|| {
            CoreError::Validation("Select a provider before selecting a document".to_string())
        })?;
        let templates = self.template_cache.get(&provider).ok_or_else(|| {
            CoreError::Validation(format!(
                "Templates for provider '{provider}' have not been loaded"
            ))
        })?;
        let index = templates
            .iter()
            .position(|t| t.id == document_id)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown template or form '{document_id}' for provider '{provider}'"
                ))
            })?;
        self.selected_document = Some(document_id.to_string());
        Ok(&self.template_cache[&provider][index])
    }

    /// The selected document's template summary, if any.
    pub fn selected_template(&self) -> Option<&TemplateSummary> {
        let provider = self.provider?;
        let document_id = self.selected_document.as_deref()?;
        self.template_cache
            .get(&provider)?
            .iter()
            .find(|t| t.id == document_id)
    }

    /// Resolve role assignments for the selected document.
    ///
    /// Uses the document's declared roles, assigning `signers` positionally
    /// and preserving details already entered for overlapping role names.
    /// A provider without a role concept always resolves to the single
    /// default role, regardless of how many signers will receive the link.
    pub fn resolve_roles(&mut self, signers: &[SignerInput]) -> Result<&[SignerRole], RoleError> {
        let declared: Vec<String> = self
            .selected_template()
            .map(|t| t.roles.clone())
            .unwrap_or_default();

        let single_role = self.provider == Some(Provider::JotForm) || declared.is_empty();
        let resolved = if single_role {
            match signers.first() {
                Some(signer) => roles::single_signer_role(signer),
                None => vec![SignerRole {
                    role_name: crate::signature::DEFAULT_ROLE.to_string(),
                    signer_name: String::new(),
                    signer_email: String::new(),
                }],
            }
        } else {
            roles::resolve(&declared, signers)?
        };

        self.signer_roles = roles::merge_preserving(&self.signer_roles, resolved);
        Ok(&self.signer_roles)
    }

    /// Fill in one signer's details. Returns `false` when the role name is
    /// not part of the current resolution.
    pub fn set_signer(&mut self, role_name: &str, name: &str, email: &str) -> bool {
        match self
            .signer_roles
            .iter_mut()
            .find(|r| r.role_name == role_name)
        {
            Some(role) => {
                role.signer_name = name.to_string();
                role.signer_email = email.to_string();
                true
            }
            None => false,
        }
    }

    /// Validate the accumulated state before dispatch.
    ///
    /// All checks must pass: a document is selected, the title is non-empty,
    /// and every resolved role has both name and email populated. Failures
    /// are field-scoped and cause no network call.
    pub fn validate(&self) -> Result<Submission, Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.selected_document.is_none() {
            errors.push(FieldError::new(
                "document",
                "Select a document or form before submitting",
            ));
        }
        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "Title is required"));
        }
        if self.signer_roles.is_empty() {
            errors.push(FieldError::new("roles", "Signer roles have not been resolved"));
        }
        for role in &self.signer_roles {
            if role.signer_name.trim().is_empty() {
                errors.push(FieldError::new(
                    format!("roles.{}.name", role.role_name),
                    "Signer name is required",
                ));
            }
            if role.signer_email.trim().is_empty() {
                errors.push(FieldError::new(
                    format!("roles.{}.email", role.role_name),
                    "Signer email is required",
                ));
            }
        }

        match &self.selected_document {
            Some(document_id) if errors.is_empty() => Ok(Submission {
                document_id: document_id.clone(),
                title: self.title.trim().to_string(),
                message: self.custom_message.clone(),
                signers: self.signer_roles.clone(),
            }),
            _ => Err(errors),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn template(id: &str, roles: &[&str]) -> TemplateSummary {
        TemplateSummary {
            id: id.to_string(),
            name: format!("Template {id}"),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn signer(name: &str, email: &str) -> SignerInput {
        SignerInput {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn starts_at_provider_selection() {
        let composer = Composer::default();
        assert_eq!(composer.step(), Step::SelectProvider);
    }

    #[test]
    fn first_provider_selection_requires_a_template_load() {
        let mut composer = Composer::default();
        assert!(composer.select_provider(Provider::BoldSign));
        assert_eq!(composer.step(), Step::LoadTemplates);

        composer.templates_loaded(Provider::BoldSign, vec![template("T1", &["Patient"])]);
        assert_eq!(composer.step(), Step::SelectDocument);
    }

    #[test]
    fn switching_back_to_a_cached_provider_skips_the_load() {
        let mut composer = Composer::default();
        composer.select_provider(Provider::BoldSign);
        composer.templates_loaded(Provider::BoldSign, vec![template("T1", &["Patient"])]);
        composer.select_provider(Provider::JotForm);
        composer.templates_loaded(Provider::JotForm, vec![template("F1", &[])]);

        // BoldSign templates are still cached from earlier in the session.
        assert!(!composer.select_provider(Provider::BoldSign));
        assert_eq!(composer.step(), Step::SelectDocument);
    }

    #[test]
    fn switching_provider_resets_document_and_roles() {
        let mut composer = Composer::default();
        composer.select_provider(Provider::BoldSign);
        composer.templates_loaded(Provider::BoldSign, vec![template("T1", &["Patient"])]);
        composer.select_document("T1").unwrap();
        composer
            .resolve_roles(&[signer("Jane Doe", "jane@x.com")])
            .unwrap();

        composer.select_provider(Provider::JotForm);
        assert_eq!(composer.selected_document(), None);
        assert_eq!(composer.step(), Step::LoadTemplates);
    }

    #[test]
    fn selecting_an_unknown_document_fails() {
        let mut composer = Composer::default();
        composer.select_provider(Provider::BoldSign);
        composer.templates_loaded(Provider::BoldSign, vec![template("T1", &["Patient"])]);
        assert!(composer.select_document("T9").is_err());
    }

    #[test]
    fn reresolution_preserves_typed_values_for_overlapping_roles() {
        let mut composer = Composer::default();
        composer.select_provider(Provider::BoldSign);
        composer.templates_loaded(
            Provider::BoldSign,
            vec![
                template("T1", &["Patient", "Witness"]),
                template("T2", &["Patient", "Nurse_Practitioner"]),
            ],
        );
        composer.select_document("T1").unwrap();
        composer.resolve_roles(&[]).unwrap();
        composer.set_signer("Patient", "Jane Doe", "jane@x.com");

        composer.select_document("T2").unwrap();
        composer.resolve_roles(&[]).unwrap();

        let roles = composer.signer_roles();
        assert_eq!(roles[0].role_name, "Patient");
        assert_eq!(roles[0].signer_email, "jane@x.com");
        assert!(roles[1].is_placeholder());
    }

    #[test]
    fn formless_provider_resolves_to_a_single_signer_role() {
        let mut composer = Composer::default();
        composer.select_provider(Provider::JotForm);
        composer.templates_loaded(Provider::JotForm, vec![template("F1", &[])]);
        composer.select_document("F1").unwrap();
        composer
            .resolve_roles(&[signer("Jane Doe", "jane@x.com")])
            .unwrap();

        let roles = composer.signer_roles();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].role_name, crate::signature::DEFAULT_ROLE);
    }

    #[test]
    fn validation_failures_are_field_scoped() {
        let mut composer = Composer::default();
        composer.select_provider(Provider::BoldSign);
        composer.templates_loaded(Provider::BoldSign, vec![template("T1", &["Patient"])]);
        composer.select_document("T1").unwrap();
        composer.resolve_roles(&[]).unwrap();
        composer.set_signer("Patient", "", "");

        let errors = composer.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"title"));
        assert!(fields.contains(&"roles.Patient.name"));
        assert!(fields.contains(&"roles.Patient.email"));
    }

    #[test]
    fn complete_state_validates_into_a_submission() {
        let mut composer = Composer::default();
        composer.select_provider(Provider::BoldSign);
        composer.templates_loaded(Provider::BoldSign, vec![template("T1", &["Patient"])]);
        composer.select_document("T1").unwrap();
        composer
            .resolve_roles(&[signer("Jane Doe", "jane@x.com")])
            .unwrap();
        composer.title = "Care plan".to_string();
        composer.custom_message = "Please sign".to_string();

        assert_eq!(composer.step(), Step::Submit);
        let submission = composer.validate().unwrap();
        assert_eq!(submission.document_id, "T1");
        assert_eq!(submission.signers.len(), 1);
        assert_eq!(submission.message, "Please sign");
    }
}
