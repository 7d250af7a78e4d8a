//! JWT-based tenant extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use caresign_core::error::CoreError;
use caresign_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated tenant extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// Use this as an extractor parameter in any handler that requires a
/// tenant context. The agency id is the tenancy boundary: every store
/// access is scoped by it, never by client input.
#[derive(Debug, Clone)]
pub struct AuthAgency {
    /// The tenant's internal database id (from `claims.sub`).
    pub agency_id: DbId,
}

impl FromRequestParts<AppState> for AuthAgency {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthAgency {
            agency_id: claims.sub,
        })
    }
}
