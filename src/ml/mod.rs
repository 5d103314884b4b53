/*!
 * # Machine Learning Module
 *
 * Calendar feature derivation and the pretrained demand model used by the
 * forecasting service.
 */

/// Per-day calendar feature rows
pub mod features;

/// Model trait and JSON artifact loader
pub mod model;

pub use features::{derive_features, FeatureRecord, FEATURE_COUNT, FEATURE_NAMES};
pub use model::{load_model, DemandModel, ModelArtifact, ModelError, ModelLoadError};
