//! Demand Forecast API Library
//!
//! Serves a form and a JSON API that forecast 15 days of sales for a
//! store/item pair using a pretrained regression model.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod ml;
pub mod models;
pub mod services;
pub mod tracing;
pub mod views;

use axum::Router;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;

/// Shared, immutable state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::AppConfig>,
    pub forecasting: services::ForecastingService,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: config::AppConfig, model: Arc<dyn ml::DemandModel>) -> Self {
        Self {
            config: Arc::new(config),
            forecasting: services::ForecastingService::new(model),
            started_at: Instant::now(),
        }
    }
}

// Common response wrappers
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Builds the full application router: form page, JSON API and health probes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::forecast::page_routes())
        .nest("/api/v1", handlers::forecast::api_routes())
        .nest("/health", handlers::health::health_routes())
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}
