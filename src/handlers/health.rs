use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::{
    ml::derive_features,
    models::forecast::{ALLOWED_ITEMS, ALLOWED_STORES},
    AppState,
};

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelHealth {
    pub status: ComponentStatus,
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_us: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub version: String,
    pub timestamp: String,
    pub uptime_secs: u64,
    pub model: ModelHealth,
}

/// Liveness probe: the process is up and holds a model.
async fn liveness_check(State(state): State<AppState>) -> impl IntoResponse {
    let model = state.forecasting.model();
    Json(HealthResponse {
        status: ComponentStatus::Up,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        model: ModelHealth {
            status: ComponentStatus::Up,
            name: model.name().to_string(),
            version: model.version().to_string(),
            message: None,
            latency_us: None,
        },
    })
}

/// Readiness probe: runs one probe prediction through the model.
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let model = state.forecasting.model();
    let probe_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN);
    let probe = derive_features(ALLOWED_STORES[0], ALLOWED_ITEMS[0], probe_date);

    let started = Instant::now();
    let outcome = model.predict(&probe);
    let latency_us = started.elapsed().as_micros() as u64;

    let (status, message) = match outcome {
        Ok(_) => (ComponentStatus::Up, None),
        Err(err) => {
            tracing::warn!(error = %err, "Readiness probe prediction failed");
            (ComponentStatus::Down, Some(err.to_string()))
        }
    };
    let code = match status {
        ComponentStatus::Up => StatusCode::OK,
        ComponentStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        model: ModelHealth {
            status,
            name: model.name().to_string(),
            version: model.version().to_string(),
            message,
            latency_us: Some(latency_us),
        },
    };

    (code, Json(body))
}

/// Health endpoints, nested under `/health`.
///
/// - GET /health       - liveness
/// - GET /health/ready - readiness (probe prediction)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(liveness_check))
        .route("/ready", get(readiness_check))
}
