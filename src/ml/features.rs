/*!
 * # Calendar features
 *
 * Builds the per-day input row consumed by the demand model.
 */

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Column order the model was trained on.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "store",
    "item",
    "year",
    "month",
    "day_of_week",
    "is_weekend",
    "prev_sunday_sales",
];

pub const FEATURE_COUNT: usize = 7;

/// One model input row for a (store, item, date) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub store: i64,
    pub item: i64,
    pub year: i32,
    /// 1-12
    pub month: u32,
    /// 0 = Monday .. 6 = Sunday
    pub day_of_week: u32,
    pub is_weekend: bool,
    /// Always 0. Historical sales for the preceding Sunday are never looked up.
    pub prev_sunday_sales: i64,
}

impl FeatureRecord {
    /// Numeric row in [`FEATURE_NAMES`] order.
    pub fn to_row(&self) -> [f64; FEATURE_COUNT] {
        [
            self.store as f64,
            self.item as f64,
            f64::from(self.year),
            f64::from(self.month),
            f64::from(self.day_of_week),
            if self.is_weekend { 1.0 } else { 0.0 },
            self.prev_sunday_sales as f64,
        ]
    }
}

/// Derives the feature record for `date`.
pub fn derive_features(store_id: i64, item_id: i64, date: NaiveDate) -> FeatureRecord {
    let day_of_week = date.weekday().num_days_from_monday();

    FeatureRecord {
        store: store_id,
        item: item_id,
        year: date.year(),
        month: date.month(),
        day_of_week,
        is_weekend: day_of_week >= 5,
        prev_sunday_sales: 0,
    }
}
