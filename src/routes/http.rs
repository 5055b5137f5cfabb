// GET handlers: version, health, liveness/readiness probes, metrics

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use crate::version::{NAME, VERSION};

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /health: basic health status plus storage reachability.
pub(super) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let storage_healthy = state.reading_repo.is_healthy().await;
    let status = if storage_healthy { "HEALTHY" } else { "DEGRADED" };
    axum::Json(serde_json::json!({
        "status": status,
        "operational": storage_healthy,
        "storage_healthy": storage_healthy,
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}

/// GET /alive: liveness probe, answers as long as the server is up.
pub(super) async fn alive_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "alive": true,
        "timestamp": chrono::Utc::now().timestamp(),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}

/// GET /ready: readiness probe, 503 until storage answers.
pub(super) async fn ready_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.reading_repo.is_healthy().await {
        (
            StatusCode::OK,
            axum::Json(serde_json::json!({"ready": true, "status": "HEALTHY"})),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            axum::Json(serde_json::json!({"ready": false, "status": "DEGRADED"})),
        )
    }
}

/// GET /metrics: per-endpoint query statistics from the shared registry.
pub(super) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.query_stats.snapshot())
}
