use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use caresign_core::compose::FieldError;
use caresign_core::error::CoreError;
use caresign_core::roles::RoleError;
use caresign_db::repositories::StoreError;
use caresign_providers::error::ProviderError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors, [`ProviderError`] for outbound
/// integration failures, and sqlx for persistence. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `caresign_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An outbound provider error, surfaced with its typed taxonomy.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Field-scoped composer validation failures.
    #[error("Validation failed")]
    Fields(Vec<FieldError>),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(db) => AppError::Database(db),
            StoreError::Core(core) => AppError::Core(core),
        }
    }
}

impl From<RoleError> for AppError {
    fn from(err: RoleError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut fields: Option<Vec<FieldError>> = None;

        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Provider errors ---
            AppError::Provider(provider) => classify_provider_error(provider),

            // --- Field-scoped validation ---
            AppError::Fields(errors) => {
                fields = Some(errors.clone());
                (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    "Validation failed".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(fields) = fields {
            body["fields"] = json!(fields);
        }

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a provider error into an HTTP status, error code, and message.
///
/// Upstream rejections map to 502, deadline overruns to 504; a missing
/// credential is the caller's configuration problem and maps to 400 with
/// an explicit, user-visible code.
fn classify_provider_error(err: &ProviderError) -> (StatusCode, &'static str, String) {
    match err {
        ProviderError::ConfigurationMissing { .. } => (
            StatusCode::BAD_REQUEST,
            "PROVIDER_NOT_CONFIGURED",
            err.to_string(),
        ),
        ProviderError::Rejected { .. } => {
            (StatusCode::BAD_GATEWAY, "PROVIDER_REJECTED", err.to_string())
        }
        ProviderError::NotAReusableTemplate { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "NOT_A_REUSABLE_TEMPLATE",
            err.to_string(),
        ),
        ProviderError::Timeout { .. } => (
            StatusCode::GATEWAY_TIMEOUT,
            "PROVIDER_TIMEOUT",
            err.to_string(),
        ),
        ProviderError::Network(inner) => {
            tracing::error!(error = %inner, "Provider network error");
            (
                StatusCode::BAD_GATEWAY,
                "PROVIDER_UNREACHABLE",
                "Could not reach the signature provider".to_string(),
            )
        }
        ProviderError::InvalidResponse(msg) => {
            tracing::error!(error = %msg, "Malformed provider response");
            (
                StatusCode::BAD_GATEWAY,
                "PROVIDER_RESPONSE_INVALID",
                "The signature provider returned an unexpected response".to_string(),
            )
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
