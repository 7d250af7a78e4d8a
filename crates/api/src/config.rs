use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Per-call deadline for outbound provider requests (default: `30`).
    pub provider_timeout_secs: u64,
    /// JWT token configuration (secret).
    pub jwt: JwtConfig,
    /// Process-level provider defaults (fallback below tenant settings).
    pub providers: ProviderDefaults,
}

/// Process-level provider configuration.
///
/// These are the fallback when a tenant has no value in `agency_settings`;
/// total absence of both yields an explicit "not configured" error.
#[derive(Debug, Clone, Default)]
pub struct ProviderDefaults {
    pub boldsign_api_key: Option<String>,
    pub jotform_api_key: Option<String>,
    pub resend_api_key: Option<String>,
    /// Default sender identity for transactional email.
    pub email_from: Option<String>,
    /// Base URL overrides, mainly for testing against stubs.
    pub boldsign_api_url: Option<String>,
    pub jotform_api_url: Option<String>,
    pub resend_api_url: Option<String>,
}

impl ProviderDefaults {
    /// Load provider defaults from environment variables.
    pub fn from_env() -> Self {
        Self {
            boldsign_api_key: env_opt("BOLDSIGN_API_KEY"),
            jotform_api_key: env_opt("JOTFORM_API_KEY"),
            resend_api_key: env_opt("RESEND_API_KEY"),
            email_from: env_opt("EMAIL_FROM"),
            boldsign_api_url: env_opt("BOLDSIGN_API_URL"),
            jotform_api_url: env_opt("JOTFORM_API_URL"),
            resend_api_url: env_opt("RESEND_API_URL"),
        }
    }
}

/// Read an optional environment variable, treating empty as unset.
fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `PROVIDER_TIMEOUT_SECS` | `30`                       |
    /// | `JWT_SECRET`            | dev-only fallback          |
    /// | `BOLDSIGN_API_KEY` etc. | unset                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let provider_timeout_secs: u64 = std::env::var("PROVIDER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("PROVIDER_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            provider_timeout_secs,
            jwt: JwtConfig::from_env(),
            providers: ProviderDefaults::from_env(),
        }
    }
}
