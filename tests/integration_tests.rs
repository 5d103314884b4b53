mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use common::{body_json, body_string, BrokenModel, TestApp};

#[test]
fn app_state_is_shareable_across_tasks() {
    fn assert_send_sync<T: Send + Sync + Clone + 'static>() {}
    assert_send_sync::<demand_forecast_api::AppState>();
}

fn table_rows(html: &str) -> Vec<(String, String)> {
    html.lines()
        .filter_map(|line| {
            let inner = line.strip_prefix("<tr><td>")?.strip_suffix("</td></tr>")?;
            let (date, value) = inner.split_once("</td><td>")?;
            Some((date.to_string(), value.to_string()))
        })
        .collect()
}

#[tokio::test]
async fn get_renders_empty_form_with_allow_lists() {
    let app = TestApp::new();

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let html = body_string(response).await;
    assert!(html.contains("name=\"store_id\""));
    assert!(html.contains("name=\"item_id\""));
    assert!(html.contains("name=\"date\""));
    assert!(html.contains("Valid stores: 1, 2, 3, 4, 5, 6, 7, 8, 9, 10."));
    assert!(table_rows(&html).is_empty());
}

#[tokio::test]
async fn post_valid_form_renders_fifteen_day_table() {
    let app = TestApp::new();

    let response = app
        .post_form("/", "store_id=1&item_id=15&date=2024-01-01")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    let rows = table_rows(&html);
    assert_eq!(rows.len(), 15);
    assert_eq!(rows[0], ("2024-01-01".to_string(), "22.50".to_string()));
    // 2024-01-06 is a Saturday
    assert_eq!(rows[5], ("2024-01-06".to_string(), "29.83".to_string()));
    assert_eq!(rows[14].0, "2024-01-15");
    assert!(!html.contains("class=\"error\""));
    // submitted values are echoed back into the form
    assert!(html.contains("value=\"2024-01-01\""));
}

#[tokio::test]
async fn post_unknown_store_shows_validation_message() {
    let app = TestApp::new();

    let response = app
        .post_form("/", "store_id=99&item_id=15&date=2024-01-01")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let html = body_string(response).await;
    assert!(html.contains("Invalid Store ID! Please select from [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]."));
    assert!(table_rows(&html).is_empty());
}

#[tokio::test]
async fn post_unknown_item_shows_validation_message() {
    let app = TestApp::new();

    let response = app
        .post_form("/", "store_id=1&item_id=999&date=2024-01-01")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let html = body_string(response).await;
    assert!(html.contains("Invalid Item ID!"));
    assert!(table_rows(&html).is_empty());
}

#[tokio::test]
async fn malformed_date_is_reported_and_server_keeps_serving() {
    let app = TestApp::new();

    let response = app
        .post_form("/", "store_id=1&item_id=15&date=2024-13-40")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_string(response).await;
    assert!(html.contains("time data &#39;2024-13-40&#39; does not match format"));
    assert!(table_rows(&html).is_empty());

    let response = app
        .post_form("/", "store_id=2&item_id=28&date=2024-03-01")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(table_rows(&body_string(response).await).len(), 15);
}

#[tokio::test]
async fn non_numeric_store_and_missing_date_are_runtime_errors() {
    let app = TestApp::new();

    let html = body_string(app.post_form("/", "store_id=abc&item_id=15&date=2024-01-01").await).await;
    assert!(html.contains("invalid integer for store_id: &#39;abc&#39;"));

    let html = body_string(app.post_form("/", "store_id=1&item_id=15").await).await;
    assert!(html.contains("missing form field &#39;date&#39;"));
}

#[tokio::test]
async fn model_failure_yields_error_page_without_table() {
    let app = TestApp::with_model(Arc::new(BrokenModel));

    let response = app
        .post_form("/", "store_id=1&item_id=15&date=2024-01-01")
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let html = body_string(response).await;
    assert!(html.contains("prediction failed for 2024-01-01: feature matrix rejected"));
    assert!(table_rows(&html).is_empty());
}

#[tokio::test]
async fn json_api_returns_forecast() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/api/v1/forecasts",
            json!({"store_id": 3, "item_id": 8, "date": "2024-02-26"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let points = body["data"]["points"].as_array().unwrap();
    assert_eq!(points.len(), 15);
    assert_eq!(points[0]["date"], "2024-02-26");
    // leap day
    assert_eq!(points[3]["date"], "2024-02-29");
    assert_eq!(points[4]["date"], "2024-03-01");
    assert_eq!(body["data"]["store_id"], 3);
}

#[tokio::test]
async fn json_api_validation_error_body() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/api/v1/forecasts",
            json!({"store_id": 99, "item_id": 15, "date": "2024-01-01"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["kind"], "validation");
    assert_eq!(
        body["message"],
        "Invalid Store ID! Please select from [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]."
    );
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn json_api_runtime_error_body() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/api/v1/forecasts",
            json!({"store_id": 1, "item_id": 15, "date": "2024-13-40"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["kind"], "runtime");
}

#[tokio::test]
async fn json_api_wrong_field_type_uses_error_body() {
    let app = TestApp::new();

    let response = app
        .post_json(
            "/api/v1/forecasts",
            json!({"store_id": "1", "item_id": 15, "date": "2024-01-01"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("application/json"));

    let body = body_json(response).await;
    assert_eq!(body["kind"], "runtime");
    assert!(body["request_id"].is_string());
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("invalid request body:"));
    assert!(message.contains("store_id"));
}

#[tokio::test]
async fn json_api_missing_date_uses_error_body() {
    let app = TestApp::new();

    let response = app
        .post_json("/api/v1/forecasts", json!({"store_id": 1, "item_id": 15}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["kind"], "runtime");
    assert!(body["message"].as_str().unwrap().contains("date"));
}

#[tokio::test]
async fn options_endpoint_lists_allow_lists() {
    let app = TestApp::new();

    let body = body_json(app.get("/api/v1/forecasts/options").await).await;
    assert_eq!(body["data"]["stores"], json!([1, 2, 3, 4, 5, 6, 7, 8, 9, 10]));
    assert_eq!(body["data"]["items"], json!([15, 28, 13, 18, 25, 45, 38, 22, 36, 8]));
    assert_eq!(body["data"]["horizon_days"], 15);
}

#[tokio::test]
async fn health_endpoints_report_model() {
    let app = TestApp::new();

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "up");
    assert_eq!(body["model"]["name"], "calendar-stub");

    let response = app.get("/health/ready").await;
    assert_eq!(response.status(), StatusCode::OK);

    let broken = TestApp::with_model(Arc::new(BrokenModel));
    let response = broken.get("/health/ready").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["model"]["status"], "down");
}
