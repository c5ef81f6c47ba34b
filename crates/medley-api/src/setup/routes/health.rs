//! Health check handlers and response types.

use crate::state::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::{http::StatusCode, response::IntoResponse, Json, Router};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/live", get(liveness_check))
}

/// Run an async check with timeout; returns status string "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(serde::Serialize)]
struct HealthCheckResponse {
    status: String,
    database: String,
    storage: String,
}

/// Liveness probe - process is running.
async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Full health check (asset store and blob storage).
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    const TIMEOUT: Duration = Duration::from_secs(5);

    let mut response = HealthCheckResponse {
        status: "healthy".to_string(),
        database: "unknown".to_string(),
        storage: "unknown".to_string(),
    };

    let assets = state.assets.clone();
    response.database = run_check(
        TIMEOUT,
        async move { assets.find_by_public_id(Uuid::nil()).await.map(drop) },
        "unhealthy",
    )
    .await;

    let blobs = state.blobs.clone();
    response.storage = run_check(
        TIMEOUT,
        async move {
            blobs
                .exists("health-check-non-existent-key")
                .await
                .map(drop)
        },
        "degraded",
    )
    .await;

    let overall_healthy = response.database == "healthy" && response.storage == "healthy";
    if !overall_healthy {
        response.status = "degraded".to_string();
    }

    let status_code = if overall_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
