/// Forecast loop over the shared demand model
pub mod forecasting;

pub use forecasting::ForecastingService;
