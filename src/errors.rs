use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ml::ModelError;
use crate::models::forecast::{ALLOWED_ITEMS, ALLOWED_STORES};

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// JSON error body returned by the API routes
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Bad Request")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// "validation" or "runtime"
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// RFC 3339 timestamp when the error occurred
    pub timestamp: String,
}

/// Coarse classification surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Store or item outside its allow-list
    Validation,
    /// Anything that went wrong while parsing or predicting
    Runtime,
}

/// Everything that can stop a single forecast request.
///
/// None of these are retried; the whole request fails and no partial
/// forecast is returned.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("Invalid Store ID! Please select from {:?}.", ALLOWED_STORES)]
    InvalidStore(i64),

    #[error("Invalid Item ID! Please select from {:?}.", ALLOWED_ITEMS)]
    InvalidItem(i64),

    #[error("missing form field '{0}'")]
    MissingField(&'static str),

    #[error("invalid integer for {field}: '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("time data '{input}' does not match format '%Y-%m-%d' ({source})")]
    InvalidDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("date {start} + {offset} days is outside the supported calendar range")]
    DateOutOfRange { start: NaiveDate, offset: u32 },

    #[error("prediction failed for {date}: {source}")]
    Prediction {
        date: NaiveDate,
        #[source]
        source: ModelError,
    },
}

impl ForecastError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidStore(_) | Self::InvalidItem(_) => ErrorKind::Validation,
            _ => ErrorKind::Runtime,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidStore(_)
            | Self::InvalidItem(_)
            | Self::MissingField(_)
            | Self::InvalidInteger { .. }
            | Self::InvalidBody(_)
            | Self::InvalidDate { .. } => StatusCode::BAD_REQUEST,
            Self::DateOutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Prediction { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the user. Every variant is surfaced verbatim.
    pub fn response_message(&self) -> String {
        self.to_string()
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let status = self.status_code();
        ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            kind: self.kind(),
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ForecastError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_error_response())).into_response()
    }
}
