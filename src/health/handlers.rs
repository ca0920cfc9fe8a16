//! Orchestrator-facing endpoints: liveness, readiness, metrics.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::http::response::{timestamp, ApiError};
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
    pub service: String,
    pub timestamp: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub service: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<crate::health::readiness::CheckResult>,
}

/// `GET /health`. Never touches a dependency or shared lock.
pub async fn liveness(State(state): State<AppState>) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "healthy",
        service: state.service.name.clone(),
        timestamp: timestamp(),
        version: state.service.version.clone(),
    })
}

/// `GET /ready`. 503 with per-check details when any dependency fails.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let results = state.readiness.run().await;
    let ready = results.iter().all(|r| r.healthy);

    let (code, status, checks) = if ready {
        (StatusCode::OK, "ready", Vec::new())
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready", results)
    };

    (
        code,
        Json(ReadinessResponse {
            status,
            service: state.service.name.clone(),
            timestamp: timestamp(),
            checks,
        }),
    )
}

/// `GET /metrics` in the Prometheus text format.
pub async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let handle = state.metrics.as_ref().ok_or(ApiError::RouteNotFound)?;
    let body = metrics::render(handle, state.runtime.as_ref());

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response())
}
