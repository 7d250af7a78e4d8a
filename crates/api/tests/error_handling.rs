//! Tests for `AppError` → HTTP response mapping.
//!
//! These tests verify that each `AppError` variant produces the correct
//! HTTP status code, error code, and message. They do NOT need an HTTP
//! server -- they call `IntoResponse` directly on `AppError` values.

use axum::response::IntoResponse;
use http_body_util::BodyExt;

use caresign_api::error::AppError;
use caresign_core::compose::FieldError;
use caresign_core::error::CoreError;
use caresign_providers::error::ProviderError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (axum::http::StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Core errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "SignatureRequest",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "SignatureRequest with id 42 not found");
}

#[tokio::test]
async fn conflict_error_returns_409() {
    let err = AppError::Core(CoreError::Conflict("illegal transition".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("secret database credentials leaked".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// Provider errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_configuration_returns_400_with_explicit_code() {
    let err = AppError::Provider(ProviderError::ConfigurationMissing {
        provider: "boldsign",
        key: "boldsign_api_key",
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "PROVIDER_NOT_CONFIGURED");
    assert!(json["error"].as_str().unwrap().contains("boldsign"));
}

#[tokio::test]
async fn provider_rejection_returns_502() {
    let err = AppError::Provider(ProviderError::Rejected {
        status: 401,
        body: "Invalid API key".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "PROVIDER_REJECTED");
}

#[tokio::test]
async fn not_a_reusable_template_returns_422_with_the_document_id() {
    let err = AppError::Provider(ProviderError::NotAReusableTemplate {
        document_id: "DOC42".into(),
        hint: "create a reusable template".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "NOT_A_REUSABLE_TEMPLATE");
    assert!(json["error"].as_str().unwrap().contains("DOC42"));
}

#[tokio::test]
async fn provider_timeout_returns_504() {
    let err = AppError::Provider(ProviderError::Timeout { seconds: 30 });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json["code"], "PROVIDER_TIMEOUT");
}

// ---------------------------------------------------------------------------
// Field-scoped validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn field_errors_are_included_in_the_body() {
    let err = AppError::Fields(vec![
        FieldError {
            field: "title".into(),
            message: "Title is required".into(),
        },
        FieldError {
            field: "roles.Patient.email".into(),
            message: "Signer email is required".into(),
        },
    ]);

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let fields = json["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0]["field"], "title");
    assert_eq!(fields[1]["field"], "roles.Patient.email");
}
