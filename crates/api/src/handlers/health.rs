//! Liveness probe.

use axum::extract::State;
use axum::Json;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /health
///
/// Returns 200 with a database reachability check.
pub async fn health(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    caresign_db::health_check(&state.pool).await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
