//! JWT validation for the tenant session token.
//!
//! Session issuance (login, refresh) lives in the main back-office
//! service; this API only validates the bearer token and extracts the
//! agency (tenant) id from its claims.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use caresign_core::types::DbId;

/// JWT token configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC signing secret shared with the session issuer.
    pub secret: String,
}

impl JwtConfig {
    /// Load the JWT configuration from the `JWT_SECRET` env var, with a
    /// development-only fallback.
    pub fn from_env() -> Self {
        Self {
            secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "dev-secret-change-me".into()),
        }
    }
}

/// Claims carried by the tenant session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Agency (tenant) id.
    pub sub: DbId,
    /// Expiry as unix seconds.
    pub exp: i64,
}

/// Validate a token and return its claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Issue a token for an agency. Used by tests and local tooling; real
/// sessions come from the back-office issuer.
pub fn issue_token(agency_id: DbId, config: &JwtConfig) -> String {
    let claims = Claims {
        sub: agency_id,
        exp: (chrono::Utc::now() + chrono::Duration::hours(8)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .expect("JWT encoding with an HMAC secret cannot fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
        }
    }

    #[test]
    fn issued_tokens_validate() {
        let token = issue_token(42, &config());
        let claims = validate_token(&token, &config()).unwrap();
        assert_eq!(claims.sub, 42);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(42, &config());
        let other = JwtConfig {
            secret: "other-secret".to_string(),
        };
        assert!(validate_token(&token, &other).is_err());
    }
}
