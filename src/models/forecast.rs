use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ForecastError;

/// Store ids the model was trained on.
pub const ALLOWED_STORES: [i64; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

/// Item ids the model was trained on, in display order.
pub const ALLOWED_ITEMS: [i64; 10] = [15, 28, 13, 18, 25, 45, 38, 22, 36, 8];

/// Number of consecutive days in every forecast.
pub const FORECAST_HORIZON_DAYS: u32 = 15;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw, untyped fields as posted by the HTML form.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ForecastForm {
    #[serde(default)]
    pub store_id: Option<String>,
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// JSON body accepted by `POST /api/v1/forecasts`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForecastApiRequest {
    pub store_id: i64,
    pub item_id: i64,
    pub date: String,
}

/// A parsed and validated forecast request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ForecastRequest {
    pub store_id: i64,
    pub item_id: i64,
    pub start_date: NaiveDate,
}

impl ForecastRequest {
    /// Validates ids against the allow-lists (store first), then parses the date.
    pub fn from_parts(store_id: i64, item_id: i64, date: &str) -> Result<Self, ForecastError> {
        if !ALLOWED_STORES.contains(&store_id) {
            return Err(ForecastError::InvalidStore(store_id));
        }
        if !ALLOWED_ITEMS.contains(&item_id) {
            return Err(ForecastError::InvalidItem(item_id));
        }
        let start_date = parse_date(date)?;

        Ok(Self {
            store_id,
            item_id,
            start_date,
        })
    }
}

impl ForecastForm {
    /// Converts the posted fields into a typed request, failing on the first problem.
    pub fn into_request(&self) -> Result<ForecastRequest, ForecastError> {
        let store_id = parse_int("store_id", self.store_id.as_deref())?;
        let item_id = parse_int("item_id", self.item_id.as_deref())?;
        let date = self.date.as_deref().ok_or(ForecastError::MissingField("date"))?;
        ForecastRequest::from_parts(store_id, item_id, date)
    }
}

impl TryFrom<&ForecastApiRequest> for ForecastRequest {
    type Error = ForecastError;

    fn try_from(body: &ForecastApiRequest) -> Result<Self, Self::Error> {
        ForecastRequest::from_parts(body.store_id, body.item_id, &body.date)
    }
}

fn parse_int(field: &'static str, raw: Option<&str>) -> Result<i64, ForecastError> {
    let raw = raw.ok_or(ForecastError::MissingField(field))?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ForecastError::InvalidInteger {
            field,
            value: raw.to_string(),
        })
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ForecastError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|source| {
        ForecastError::InvalidDate {
            input: raw.to_string(),
            source,
        }
    })
}

/// One forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// "YYYY-MM-DD"
    pub date: String,
    /// Model output rounded to 2 decimal places
    pub predicted_sales: f64,
}

/// Forecast covering `start_date` through `start_date + 14` in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub store_id: i64,
    pub item_id: i64,
    pub start_date: String,
    pub points: Vec<ForecastPoint>,
}

/// Allow-lists published to clients for input guidance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastOptions {
    pub stores: Vec<i64>,
    pub items: Vec<i64>,
    pub horizon_days: u32,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            stores: ALLOWED_STORES.to_vec(),
            items: ALLOWED_ITEMS.to_vec(),
            horizon_days: FORECAST_HORIZON_DAYS,
        }
    }
}
