//! Liveness and readiness probes

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub database: bool,
}

/// Always OK while the process serves requests
async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// OK once the database answers; 503 otherwise
async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let database = sqlx::query("SELECT 1")
        .fetch_one(state.db.pool())
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Readiness check failed"))
        .is_ok();

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(ReadyResponse {
            ready: database,
            database,
        }),
    )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
