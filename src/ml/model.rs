/*!
 * # Demand model
 *
 * The forecast loop only ever calls [`DemandModel::predict`]. The bundled
 * implementation reads a JSON artifact exported from the training pipeline,
 * either a linear regression or a tree ensemble.
 */

use super::features::{FeatureRecord, FEATURE_COUNT, FEATURE_NAMES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors raised while predicting a single row
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("model produced a non-finite prediction ({0})")]
    NonFinite(f64),

    #[error("{0}")]
    Backend(String),
}

/// Errors raised while loading the model artifact at startup
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to deserialize model file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

/// Interface for the pretrained regression model.
///
/// Implementations must be reentrant: one instance is shared by every request.
pub trait DemandModel: Send + Sync {
    /// Predict sales for a single feature row.
    fn predict(&self, features: &FeatureRecord) -> Result<f64, ModelError>;

    /// Model name
    fn name(&self) -> &str;

    /// Model version
    fn version(&self) -> &str;
}

/// Serialized model artifact, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsembleModel),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub name: String,
    pub version: String,
    pub feature_names: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Random-forest style averaging
    Mean,
    /// Gradient-boosting style summation
    Sum,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsembleModel {
    pub name: String,
    pub version: String,
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub base_score: f64,
    pub aggregation: Aggregation,
    pub trees: Vec<Tree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

/// Tree node. Rows go left when `row[feature] <= threshold`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl LinearModel {
    fn validate(&self) -> Result<(), ModelLoadError> {
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(ModelLoadError::Invalid(format!(
                "expected {} coefficients, found {}",
                FEATURE_COUNT,
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelLoadError::Invalid(
                "linear model parameters must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl DemandModel for LinearModel {
    fn predict(&self, features: &FeatureRecord) -> Result<f64, ModelError> {
        let value = features
            .to_row()
            .iter()
            .zip(&self.coefficients)
            .fold(self.intercept, |acc, (x, w)| acc + x * w);
        finite(value)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }
}

impl Tree {
    fn validate(&self, index: usize) -> Result<(), ModelLoadError> {
        if self.nodes.is_empty() {
            return Err(ModelLoadError::Invalid(format!("tree {} has no nodes", index)));
        }
        for (position, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(ModelLoadError::Invalid(format!(
                            "tree {} node {} splits on unknown feature {}",
                            index, position, feature
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelLoadError::Invalid(format!(
                            "tree {} node {} has a non-finite threshold",
                            index, position
                        )));
                    }
                    // Children strictly after their parent keeps every walk finite.
                    for child in [*left, *right] {
                        if child <= position || child >= self.nodes.len() {
                            return Err(ModelLoadError::Invalid(format!(
                                "tree {} node {} has out-of-order child {}",
                                index, position, child
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(ModelLoadError::Invalid(format!(
                            "tree {} node {} has a non-finite leaf",
                            index, position
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, row: &[f64; FEATURE_COUNT]) -> Result<f64, ModelError> {
        let mut position = 0;
        loop {
            match self.nodes.get(position) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    position = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                None => {
                    return Err(ModelError::Backend(format!(
                        "tree node {} does not exist",
                        position
                    )))
                }
            }
        }
    }
}

impl TreeEnsembleModel {
    fn validate(&self) -> Result<(), ModelLoadError> {
        if self.trees.is_empty() {
            return Err(ModelLoadError::Invalid(
                "tree ensemble has no trees".to_string(),
            ));
        }
        if !self.base_score.is_finite() {
            return Err(ModelLoadError::Invalid(
                "base_score must be finite".to_string(),
            ));
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(index, tree)| tree.validate(index))
    }
}

impl DemandModel for TreeEnsembleModel {
    fn predict(&self, features: &FeatureRecord) -> Result<f64, ModelError> {
        let row = features.to_row();
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.evaluate(&row)?;
        }
        let combined = match self.aggregation {
            Aggregation::Mean => total / self.trees.len() as f64,
            Aggregation::Sum => total,
        };
        finite(self.base_score + combined)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }
}

impl ModelArtifact {
    fn feature_names(&self) -> &[String] {
        match self {
            ModelArtifact::Linear(model) => &model.feature_names,
            ModelArtifact::TreeEnsemble(model) => &model.feature_names,
        }
    }

    /// Checks the artifact is structurally usable before it serves traffic.
    pub fn validate(&self) -> Result<(), ModelLoadError> {
        let names = self.feature_names();
        if names.len() != FEATURE_COUNT || names.iter().zip(FEATURE_NAMES).any(|(a, b)| a != b) {
            return Err(ModelLoadError::Invalid(format!(
                "feature_names must be {:?}, found {:?}",
                FEATURE_NAMES, names
            )));
        }
        match self {
            ModelArtifact::Linear(model) => model.validate(),
            ModelArtifact::TreeEnsemble(model) => model.validate(),
        }
    }

    pub fn into_model(self) -> Arc<dyn DemandModel> {
        match self {
            ModelArtifact::Linear(model) => Arc::new(model),
            ModelArtifact::TreeEnsemble(model) => Arc::new(model),
        }
    }
}

/// Parses and validates an artifact from JSON text.
pub fn parse_model(json: &str, path: &Path) -> Result<Arc<dyn DemandModel>, ModelLoadError> {
    let artifact: ModelArtifact =
        serde_json::from_str(json).map_err(|source| ModelLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    artifact.validate()?;
    Ok(artifact.into_model())
}

/// Loads the model artifact at `path`. Called once at process start.
pub fn load_model(path: impl AsRef<Path>) -> Result<Arc<dyn DemandModel>, ModelLoadError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let model = parse_model(&json, path)?;
    info!(
        model = model.name(),
        version = model.version(),
        path = %path.display(),
        "Demand model loaded"
    );
    Ok(model)
}

fn finite(value: f64) -> Result<f64, ModelError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ModelError::NonFinite(value))
    }
}
