#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use demand_forecast_api::{
    config::AppConfig,
    ml::{DemandModel, FeatureRecord, ModelError},
    app_router, AppState,
};
use serde_json::Value;
use tower::ServiceExt;

/// Deterministic stand-in for the trained model: weekends sell more.
pub struct CalendarModel;

impl DemandModel for CalendarModel {
    fn predict(&self, features: &FeatureRecord) -> Result<f64, ModelError> {
        let base = 20.0 + features.store as f64 + features.item as f64 / 10.0;
        let weekend_boost = if features.is_weekend { 7.333 } else { 0.0 };
        Ok(base + weekend_boost)
    }

    fn name(&self) -> &str {
        "calendar-stub"
    }

    fn version(&self) -> &str {
        "test"
    }
}

/// Always fails, to exercise the runtime error path.
pub struct BrokenModel;

impl DemandModel for BrokenModel {
    fn predict(&self, _features: &FeatureRecord) -> Result<f64, ModelError> {
        Err(ModelError::Backend("feature matrix rejected".into()))
    }

    fn name(&self) -> &str {
        "broken"
    }

    fn version(&self) -> &str {
        "test"
    }
}

/// Helper harness around the application router.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_model(Arc::new(CalendarModel))
    }

    pub fn with_model(model: Arc<dyn DemandModel>) -> Self {
        let state = AppState::new(AppConfig::default(), model);
        Self {
            router: app_router(state),
        }
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method(Method::GET)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_form(&self, uri: &str, body: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
