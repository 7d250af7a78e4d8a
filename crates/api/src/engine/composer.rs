//! Server-side request composition engine.
//!
//! Drives the pure [`Composer`] state machine through the full submission
//! flow: provider selection, template loading (skipped when the session
//! cache already holds the provider's list), document selection, role
//! resolution, validation, provider dispatch, persistence, and
//! notification fan-out. Validation failures surface field-scoped and
//! perform no network call; a failed dispatch persists nothing.

use serde::Serialize;

use caresign_core::compose::Composer;
use caresign_core::roles::SignerInput;
use caresign_core::signature::{
    validate_initial_status, validate_recipients, Provider, Recipient, RequestStatus,
    TemplateSummary, DEFAULT_ROLE,
};
use caresign_core::types::DbId;
use caresign_db::models::signature_request::{NewSignatureRequest, SignatureRequest};
use caresign_db::repositories::SignatureRequestRepo;
use caresign_db::DbPool;
use caresign_providers::adapter::{ProviderAdapter, SendRequest};
use caresign_providers::error::ProviderError;
use caresign_providers::retry::{retry_idempotent, with_timeout, RetryPolicy};

use crate::engine::credentials;
use crate::error::AppError;
use crate::notifications::dispatcher::{self, DeliveryOutcome, Mailer};
use crate::state::AppState;

/// Input accepted by the submission engine.
#[derive(Debug, Clone)]
pub struct SubmissionInput {
    pub provider: Provider,
    /// Provider template/form identifier to send from.
    pub external_request_id: String,
    pub title: String,
    pub custom_message: Option<String>,
    pub recipients: Vec<Recipient>,
    /// Client-supplied initial status; only `draft` or `sent` are legal.
    pub initial_status: Option<RequestStatus>,
    /// Caller-known direct access URL (legacy JotForm path).
    pub form_url: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Result of a submission: created rows plus per-recipient delivery
/// outcomes, in dispatch order.
#[derive(Debug, Serialize)]
pub struct SubmissionResult {
    pub requests: Vec<SignatureRequest>,
    pub deliveries: Vec<DeliveryOutcome>,
}

/// Submit a signature request using per-call resolved credentials.
pub async fn submit(
    state: &AppState,
    agency_id: DbId,
    input: SubmissionInput,
) -> Result<SubmissionResult, AppError> {
    // Reject malformed input before resolving any credential, so a
    // misconfigured tenant still gets validation feedback first.
    validate_recipients(&input.recipients)?;
    if let Some(status) = input.initial_status {
        validate_initial_status(status)?;
    }

    let adapter =
        credentials::build_signature_adapter(&state.pool, &state.config, agency_id, input.provider)
            .await?;
    let mailer = maybe_mailer(&state.pool, &state.config, agency_id).await?;
    submit_with_adapter(
        &state.pool,
        agency_id,
        adapter.as_ref(),
        mailer.as_ref(),
        state.config.provider_timeout_secs,
        input,
    )
    .await
}

/// Build the tenant's mailer, treating missing email configuration as
/// "no mailer" rather than a hard failure: notification outcomes record
/// the skip instead.
pub async fn maybe_mailer(
    pool: &DbPool,
    config: &crate::config::ServerConfig,
    agency_id: DbId,
) -> Result<Option<Mailer>, AppError> {
    let client = match credentials::build_email_client(pool, config, agency_id).await {
        Ok(client) => client,
        Err(AppError::Provider(ProviderError::ConfigurationMissing { .. })) => return Ok(None),
        Err(err) => return Err(err),
    };
    let from = match credentials::resolve_email_from(pool, config, agency_id).await {
        Ok(from) => from,
        Err(AppError::Provider(ProviderError::ConfigurationMissing { .. })) => return Ok(None),
        Err(err) => return Err(err),
    };
    Ok(Some(Mailer { client, from }))
}

/// Submission flow against an already-constructed adapter. Separated from
/// [`submit`] so tests can drive it with a stub adapter.
pub async fn submit_with_adapter(
    pool: &DbPool,
    agency_id: DbId,
    adapter: &dyn ProviderAdapter,
    mailer: Option<&Mailer>,
    timeout_secs: u64,
    input: SubmissionInput,
) -> Result<SubmissionResult, AppError> {
    // Shape validation first: no network call happens for bad input.
    validate_recipients(&input.recipients)?;
    if let Some(status) = input.initial_status {
        validate_initial_status(status)?;
    }

    // Walk the composition state machine.
    let mut composer = Composer::default();
    if composer.select_provider(input.provider) {
        let templates = load_templates(adapter, timeout_secs, &input).await?;
        composer.templates_loaded(input.provider, templates);
    }
    composer.select_document(&input.external_request_id)?;

    let signers: Vec<SignerInput> = input
        .recipients
        .iter()
        .map(|r| SignerInput {
            name: r.name.clone(),
            email: r.email.clone(),
        })
        .collect();
    composer.resolve_roles(&signers)?;
    composer.title = input.title.clone();
    composer.custom_message = input.custom_message.clone().unwrap_or_default();

    let submission = composer.validate().map_err(AppError::Fields)?;

    // Dispatch. Sends are never retried: a duplicate send creates a real
    // second signature request. On failure nothing is persisted.
    let outcome = with_timeout(
        timeout_secs,
        adapter.send(&SendRequest {
            document_id: submission.document_id.clone(),
            title: submission.title.clone(),
            message: submission.message.clone(),
            signers: submission.signers.clone(),
        }),
    )
    .await?;

    let status = input.initial_status.unwrap_or(RequestStatus::Sent);
    let sent_date = (status == RequestStatus::Sent).then(chrono::Utc::now);
    let direct_url = outcome
        .signing_links
        .first()
        .map(|link| link.url.clone())
        .or_else(|| input.form_url.clone());
    let metadata = match &input.metadata {
        Some(metadata) => Some(metadata.clone()),
        None => serde_json::to_value(&outcome)
            .ok()
            .map(|response| serde_json::json!({ "provider_response": response })),
    };

    // Row fan-out: one row per recipient for the single-signer provider,
    // one row carrying the full ordered role list for BoldSign.
    let recipient_groups: Vec<Vec<Recipient>> = match input.provider {
        Provider::JotForm => input
            .recipients
            .iter()
            .map(|r| {
                vec![Recipient {
                    name: r.name.clone(),
                    email: r.email.clone(),
                    role: DEFAULT_ROLE.to_string(),
                }]
            })
            .collect(),
        Provider::BoldSign => vec![submission
            .signers
            .iter()
            .map(|s| Recipient {
                name: s.signer_name.clone(),
                email: s.signer_email.clone(),
                role: s.role_name.clone(),
            })
            .collect()],
    };

    let mut requests = Vec::with_capacity(recipient_groups.len());
    for recipients in recipient_groups {
        let created = SignatureRequestRepo::create(
            pool,
            agency_id,
            NewSignatureRequest {
                title: input.title.clone(),
                custom_message: input.custom_message.clone(),
                provider: input.provider,
                external_request_id: input.external_request_id.clone(),
                external_document_id: Some(outcome.external_document_id.clone()),
                recipients,
                status,
                sent_date,
                signature_url: direct_url.clone(),
                metadata: metadata.clone(),
            },
        )
        .await?;
        requests.push(created);
    }

    // Notification dispatch is sequential per recipient and never rolls
    // back the created rows.
    let mut deliveries = Vec::new();
    for request in &requests {
        deliveries.extend(dispatcher::dispatch(mailer, request).await);
    }

    tracing::info!(
        agency_id,
        provider = %input.provider,
        requests = requests.len(),
        deliveries = deliveries.len(),
        "Signature request submitted",
    );

    Ok(SubmissionResult {
        requests,
        deliveries,
    })
}

/// Load the template list for the submission's provider.
///
/// BoldSign exposes a real template listing (an idempotent read, retried
/// under the bounded policy). JotForm has no template concept: the form
/// itself is the document, so a single-role summary is synthesized and
/// the form's existence is checked by the send call.
async fn load_templates(
    adapter: &dyn ProviderAdapter,
    timeout_secs: u64,
    input: &SubmissionInput,
) -> Result<Vec<TemplateSummary>, AppError> {
    match input.provider {
        Provider::JotForm => Ok(vec![TemplateSummary {
            id: input.external_request_id.clone(),
            name: input.title.clone(),
            roles: vec![DEFAULT_ROLE.to_string()],
        }]),
        Provider::BoldSign => {
            let policy = RetryPolicy::default();
            let templates = retry_idempotent(&policy, || {
                with_timeout(timeout_secs, adapter.list_templates())
            })
            .await?;
            Ok(templates)
        }
    }
}
