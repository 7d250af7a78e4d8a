//! HTTP-level integration tests for the `/signatures` endpoints:
//! validation before any network call, tenant isolation, and the
//! bulk-cleanup path.

mod common;

use axum::http::StatusCode;
use sqlx::PgPool;
use tower::ServiceExt;

use caresign_core::signature::{Provider, Recipient, RequestStatus};
use caresign_db::models::signature_request::NewSignatureRequest;
use caresign_db::repositories::SignatureRequestRepo;

use common::{auth_token, body_json, build_test_app, delete, get, post_json};

/// Insert a sent request directly through the repository.
async fn seed_request(pool: &PgPool, agency_id: i64, title: &str) -> i64 {
    let created = SignatureRequestRepo::create(
        pool,
        agency_id,
        NewSignatureRequest {
            title: title.to_string(),
            custom_message: None,
            provider: Provider::JotForm,
            external_request_id: "F1".to_string(),
            external_document_id: Some("F1".to_string()),
            recipients: vec![Recipient {
                name: "Jane Doe".to_string(),
                email: "jane@x.com".to_string(),
                role: "Signer".to_string(),
            }],
            status: RequestStatus::Sent,
            sent_date: Some(chrono::Utc::now()),
            signature_url: Some("https://form.jotform.com/F1".to_string()),
            metadata: None,
        },
    )
    .await
    .unwrap();
    created.id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_token_is_unauthorized(pool: PgPool) {
    let app = build_test_app(pool);
    let response = app
        .oneshot(
            axum::http::Request::builder()
                .method("GET")
                .uri("/api/v1/signatures")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_with_zero_recipients_is_rejected(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let token = auth_token(1);

    let response = post_json(
        app,
        &token,
        "/api/v1/signatures",
        serde_json::json!({
            "title": "Care plan",
            "recipients": [],
            "provider": "jotform",
            "external_request_id": "F1",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing was persisted.
    let app = build_test_app(pool);
    let list = get(app, &token, "/api/v1/signatures").await;
    let json = body_json(list).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_with_terminal_status_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let token = auth_token(1);

    let response = post_json(
        app,
        &token,
        "/api/v1/signatures",
        serde_json::json!({
            "title": "Care plan",
            "recipients": [{ "name": "Jane Doe", "email": "jane@x.com" }],
            "provider": "jotform",
            "external_request_id": "F1",
            "status": "completed",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_without_provider_credentials_is_an_explicit_error(pool: PgPool) {
    let app = build_test_app(pool);
    let token = auth_token(1);

    let response = post_json(
        app,
        &token,
        "/api/v1/signatures",
        serde_json::json!({
            "title": "Care plan",
            "recipients": [{ "name": "Jane Doe", "email": "jane@x.com" }],
            "provider": "jotform",
            "external_request_id": "F1",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "PROVIDER_NOT_CONFIGURED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn listing_is_tenant_scoped(pool: PgPool) {
    seed_request(&pool, 1, "Tenant A request").await;

    let app = build_test_app(pool.clone());
    let own = get(app, &auth_token(1), "/api/v1/signatures").await;
    assert_eq!(own.status(), StatusCode::OK);
    let own_json = body_json(own).await;
    assert_eq!(own_json["data"].as_array().unwrap().len(), 1);

    let app = build_test_app(pool);
    let other = get(app, &auth_token(2), "/api/v1/signatures").await;
    let other_json = body_json(other).await;
    assert_eq!(other_json["data"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cross_tenant_get_is_not_found(pool: PgPool) {
    let id = seed_request(&pool, 1, "Tenant A request").await;

    let app = build_test_app(pool);
    let response = get(app, &auth_token(2), &format!("/api/v1/signatures/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sync_of_unknown_request_is_not_found(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        app,
        &auth_token(1),
        "/api/v1/signatures/999999/sync",
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bulk_cleanup_only_touches_the_callers_tenant(pool: PgPool) {
    seed_request(&pool, 1, "Mine").await;
    seed_request(&pool, 2, "Theirs").await;

    let app = build_test_app(pool.clone());
    let response = delete(app, &auth_token(1), "/api/v1/signatures").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["deleted"], 1);

    let app = build_test_app(pool);
    let remaining = get(app, &auth_token(2), "/api/v1/signatures").await;
    let remaining_json = body_json(remaining).await;
    assert_eq!(remaining_json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_filter_uses_the_typed_enum(pool: PgPool) {
    seed_request(&pool, 1, "Sent request").await;

    let app = build_test_app(pool.clone());
    let sent = get(app, &auth_token(1), "/api/v1/signatures?status=sent").await;
    let sent_json = body_json(sent).await;
    assert_eq!(sent_json["data"].as_array().unwrap().len(), 1);

    let app = build_test_app(pool);
    let completed = get(app, &auth_token(1), "/api/v1/signatures?status=completed").await;
    let completed_json = body_json(completed).await;
    assert_eq!(completed_json["data"].as_array().unwrap().len(), 0);
}
