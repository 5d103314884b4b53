use std::sync::Arc;

use chrono::Days;
use tracing::{debug, info, instrument};

use crate::{
    errors::ForecastError,
    ml::{derive_features, DemandModel},
    models::forecast::{
        ForecastPoint, ForecastRequest, ForecastResult, DATE_FORMAT, FORECAST_HORIZON_DAYS,
    },
};

/// Runs the fixed-horizon forecast loop against the shared model.
#[derive(Clone)]
pub struct ForecastingService {
    model: Arc<dyn DemandModel>,
}

impl ForecastingService {
    pub fn new(model: Arc<dyn DemandModel>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &dyn DemandModel {
        self.model.as_ref()
    }

    /// Predicts one value per day for `start_date..=start_date + 14`.
    ///
    /// The first failing day aborts the whole forecast; no partial result is
    /// returned.
    #[instrument(skip(self), fields(model = self.model.name()))]
    pub fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResult, ForecastError> {
        let mut points = Vec::with_capacity(FORECAST_HORIZON_DAYS as usize);

        for offset in 0..FORECAST_HORIZON_DAYS {
            let target = request
                .start_date
                .checked_add_days(Days::new(u64::from(offset)))
                .ok_or(ForecastError::DateOutOfRange {
                    start: request.start_date,
                    offset,
                })?;

            let features = derive_features(request.store_id, request.item_id, target);
            let raw = self
                .model
                .predict(&features)
                .map_err(|source| ForecastError::Prediction {
                    date: target,
                    source,
                })?;

            debug!(date = %target, raw, "Predicted day");
            points.push(ForecastPoint {
                date: target.format(DATE_FORMAT).to_string(),
                predicted_sales: round_to_cents(raw),
            });
        }

        info!(
            store_id = request.store_id,
            item_id = request.item_id,
            days = points.len(),
            "Forecast generated"
        );

        Ok(ForecastResult {
            store_id: request.store_id,
            item_id: request.item_id,
            start_date: request.start_date.format(DATE_FORMAT).to_string(),
            points,
        })
    }
}

/// Rounds to 2 decimal places, halves away from zero.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
