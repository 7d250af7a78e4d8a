//! Tenant-scoped provider credential resolution.
//!
//! Lookup order: the tenant's `agency_settings` row, then the process
//! environment default from [`crate::config::ProviderDefaults`]. Total
//! absence yields the explicit
//! [`ProviderError::ConfigurationMissing`] rather than a generic failure.

use caresign_core::signature::Provider;
use caresign_core::types::DbId;
use caresign_db::repositories::SettingRepo;
use caresign_db::DbPool;
use caresign_providers::adapter::{adapter_for, ProviderAdapter};
use caresign_providers::credential::Credential;
use caresign_providers::error::ProviderError;
use caresign_providers::resend::ResendClient;

use crate::config::ServerConfig;
use crate::error::AppError;

/// Setting key for the BoldSign API key.
pub const KEY_BOLDSIGN_API_KEY: &str = "boldsign_api_key";
/// Setting key for the JotForm API key.
pub const KEY_JOTFORM_API_KEY: &str = "jotform_api_key";
/// Setting key for the Resend API key.
pub const KEY_RESEND_API_KEY: &str = "resend_api_key";
/// Setting key for the default sender identity.
pub const KEY_EMAIL_FROM: &str = "email_from";

/// Resolve a tenant's credential for an e-signature provider.
pub async fn resolve_provider_credential(
    pool: &DbPool,
    config: &ServerConfig,
    agency_id: DbId,
    provider: Provider,
) -> Result<Credential, AppError> {
    let (key, fallback) = match provider {
        Provider::BoldSign => (
            KEY_BOLDSIGN_API_KEY,
            config.providers.boldsign_api_key.as_deref(),
        ),
        Provider::JotForm => (
            KEY_JOTFORM_API_KEY,
            config.providers.jotform_api_key.as_deref(),
        ),
    };
    resolve(pool, agency_id, provider.as_str(), key, fallback).await
}

/// Resolve a tenant's credential for the transactional email provider.
pub async fn resolve_email_credential(
    pool: &DbPool,
    config: &ServerConfig,
    agency_id: DbId,
) -> Result<Credential, AppError> {
    resolve(
        pool,
        agency_id,
        "resend",
        KEY_RESEND_API_KEY,
        config.providers.resend_api_key.as_deref(),
    )
    .await
}

/// Resolve a tenant's sender identity for transactional email.
pub async fn resolve_email_from(
    pool: &DbPool,
    config: &ServerConfig,
    agency_id: DbId,
) -> Result<String, AppError> {
    if let Some(value) = SettingRepo::get_value(pool, agency_id, KEY_EMAIL_FROM).await? {
        if !value.trim().is_empty() {
            return Ok(value);
        }
    }
    match config.providers.email_from.as_deref() {
        Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
        _ => Err(ProviderError::ConfigurationMissing {
            provider: "resend",
            key: KEY_EMAIL_FROM,
        }
        .into()),
    }
}

async fn resolve(
    pool: &DbPool,
    agency_id: DbId,
    provider: &'static str,
    key: &'static str,
    fallback: Option<&str>,
) -> Result<Credential, AppError> {
    if let Some(value) = SettingRepo::get_value(pool, agency_id, key).await? {
        if !value.trim().is_empty() {
            return Ok(Credential::new(value));
        }
    }
    match fallback {
        Some(value) if !value.trim().is_empty() => Ok(Credential::new(value)),
        _ => Err(ProviderError::ConfigurationMissing { provider, key }.into()),
    }
}

/// Construct the e-signature adapter for `provider` from a freshly
/// resolved tenant credential, honoring any configured base URL override.
pub async fn build_signature_adapter(
    pool: &DbPool,
    config: &ServerConfig,
    agency_id: DbId,
    provider: Provider,
) -> Result<Box<dyn ProviderAdapter>, AppError> {
    let credential = resolve_provider_credential(pool, config, agency_id, provider).await?;
    let base_url = match provider {
        Provider::BoldSign => config.providers.boldsign_api_url.as_deref(),
        Provider::JotForm => config.providers.jotform_api_url.as_deref(),
    };
    Ok(adapter_for(provider, credential, base_url))
}

/// Construct the email client from a freshly resolved tenant credential.
pub async fn build_email_client(
    pool: &DbPool,
    config: &ServerConfig,
    agency_id: DbId,
) -> Result<ResendClient, AppError> {
    let credential = resolve_email_credential(pool, config, agency_id).await?;
    let client = match config.providers.resend_api_url.as_deref() {
        Some(url) => ResendClient::with_base_url(credential, url.to_string()),
        None => ResendClient::new(credential),
    };
    Ok(client)
}
