pub mod forecast;

pub use forecast::{
    ForecastApiRequest, ForecastForm, ForecastOptions, ForecastPoint, ForecastRequest,
    ForecastResult, ALLOWED_ITEMS, ALLOWED_STORES, FORECAST_HORIZON_DAYS,
};
