use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{error, warn};

use crate::{
    errors::ForecastError,
    models::forecast::{
        ForecastApiRequest, ForecastForm, ForecastOptions, ForecastRequest, ForecastResult,
    },
    views::{render_index, IndexView},
    ApiResponse, AppState,
};

/// Form page routes mounted at the site root.
pub fn page_routes() -> Router<AppState> {
    Router::new().route("/", get(index_page).post(submit_form))
}

/// JSON routes, nested under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/forecasts", post(create_forecast))
        .route("/forecasts/options", get(forecast_options))
}

/// GET / renders the empty form.
pub async fn index_page() -> Html<String> {
    Html(render_index(&IndexView::default()))
}

/// POST / runs the forecast and re-renders the page with a table or an error.
pub async fn submit_form(State(state): State<AppState>, Form(form): Form<ForecastForm>) -> Response {
    let outcome = form
        .into_request()
        .and_then(|request| state.forecasting.forecast(&request));

    match outcome {
        Ok(result) => {
            let view = IndexView {
                form: Some(&form),
                result: Some(&result),
                error_message: None,
            };
            Html(render_index(&view)).into_response()
        }
        Err(err) => {
            log_failure(&err);
            let view = IndexView {
                form: Some(&form),
                result: None,
                error_message: Some(err.response_message()),
            };
            (err.status_code(), Html(render_index(&view))).into_response()
        }
    }
}

/// POST /api/v1/forecasts
pub async fn create_forecast(
    State(state): State<AppState>,
    payload: Result<Json<ForecastApiRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ForecastResult>>), ForecastError> {
    let outcome = payload
        .map_err(|rejection| ForecastError::InvalidBody(rejection.body_text()))
        .and_then(|Json(body)| ForecastRequest::try_from(&body))
        .and_then(|request| state.forecasting.forecast(&request));

    match outcome {
        Ok(result) => Ok((StatusCode::OK, Json(ApiResponse::success(result)))),
        Err(err) => {
            log_failure(&err);
            Err(err)
        }
    }
}

/// GET /api/v1/forecasts/options
pub async fn forecast_options() -> Json<ApiResponse<ForecastOptions>> {
    Json(ApiResponse::success(ForecastOptions::default()))
}

fn log_failure(err: &ForecastError) {
    if err.is_validation() {
        warn!(error = %err, "Forecast request rejected");
    } else {
        error!(error = %err, "Forecast request failed");
    }
}
