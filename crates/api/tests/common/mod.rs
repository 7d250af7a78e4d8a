//! Shared harness for HTTP-level integration tests.
//!
//! Uses Axum's `tower::ServiceExt` to send requests directly to the
//! router without a TCP listener, mirroring the router construction in
//! `main.rs` so tests exercise the production middleware stack.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use caresign_api::auth::jwt::{issue_token, JwtConfig};
use caresign_api::config::{ProviderDefaults, ServerConfig};
use caresign_api::router::build_app_router;
use caresign_api::state::AppState;
use caresign_core::types::DbId;

/// Build a test `ServerConfig` with safe defaults and no process-level
/// provider credentials, so credential resolution is deterministic.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        provider_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "test-secret".to_string(),
        },
        providers: ProviderDefaults::default(),
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Issue a bearer token for an agency, signed with the test secret.
pub fn auth_token(agency_id: DbId) -> String {
    issue_token(
        agency_id,
        &JwtConfig {
            secret: "test-secret".to_string(),
        },
    )
}

/// Send a GET request with a tenant token.
pub async fn get(app: Router, token: &str, path: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(path)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a JSON body and a tenant token.
pub async fn post_json(
    app: Router,
    token: &str,
    path: &str,
    body: serde_json::Value,
) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(path)
            .header("authorization", format!("Bearer {token}"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a DELETE request with a tenant token.
pub async fn delete(app: Router, token: &str, path: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method("DELETE")
            .uri(path)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into parsed JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
