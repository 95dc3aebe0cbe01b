//! Pre-trained point predictors
//!
//! A model is shipped as a JSON artifact produced by the training pipeline:
//!
//! ```json
//! {
//!   "features": ["month_num", "year", "lag_1", "lag_2", "lag_3", "rolling_3"],
//!   "model": { "kind": "linear", "intercept": 120.0, "coefficients": [...] }
//! }
//! ```
//!
//! `features` is the column order the model was trained with. Two model kinds
//! are supported:
//! - `linear`: intercept plus one coefficient per feature
//! - `tree_ensemble`: regression trees combined by `sum` (boosting, offset by
//!   `base_score`) or `mean` (random forest)
//!
//! Artifacts are validated once at load time. Evaluation still checks node and
//! feature indices, since ensembles can also be built by hand and wrapped with
//! [`ForecastModel::new`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::features::{parse_feature_order, FeatureName, FeatureVector};

/// A regression model that maps one feature row to one scalar
///
/// Implementations are immutable after construction and shared across
/// concurrent requests.
pub trait Predictor: Send + Sync {
    /// Predict from a row laid out in the model's declared feature order
    fn predict(&self, row: &[f64]) -> Result<f64>;

    /// Short model kind for diagnostics
    fn kind(&self) -> &'static str;
}

/// Ordinary linear regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default)]
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl Predictor for LinearModel {
    fn predict(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.coefficients.len() {
            return Err(Error::Prediction(format!(
                "Expected {} features, got {}",
                self.coefficients.len(),
                row.len()
            )));
        }

        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>())
    }

    fn kind(&self) -> &'static str {
        "linear"
    }
}

/// A node of a regression tree
///
/// Split nodes send rows with `row[feature] <= threshold` to `left`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
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

/// A single regression tree stored as a flat node array (root at index 0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn evaluate(&self, row: &[f64]) -> Result<f64> {
        let mut index = 0;
        loop {
            let node = self.nodes.get(index).ok_or_else(|| {
                Error::Prediction(format!("Tree has no node at index {}", index))
            })?;
            match *node {
                TreeNode::Leaf { value } => return Ok(value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = row.get(feature).copied().ok_or_else(|| {
                        Error::Prediction(format!(
                            "Tree splits on feature {} but the row has {}",
                            feature,
                            row.len()
                        ))
                    })?;
                    let next = if x <= threshold { left } else { right };
                    // Forward-only children guarantee termination
                    if next <= index {
                        return Err(Error::Prediction(format!(
                            "Tree node {} points back to node {}",
                            index, next
                        )));
                    }
                    index = next;
                }
            }
        }
    }

    /// Children must point forward so evaluation always terminates.
    fn validate(&self, tree_index: usize, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::ModelLoad(format!("Tree {} has no nodes", tree_index)));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(Error::ModelLoad(format!(
                            "Tree {} node {} has a non-finite leaf value",
                            tree_index, i
                        )));
                    }
                }
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= n_features {
                        return Err(Error::ModelLoad(format!(
                            "Tree {} node {} splits on feature {} but only {} are declared",
                            tree_index, i, feature, n_features
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(Error::ModelLoad(format!(
                            "Tree {} node {} has a NaN threshold",
                            tree_index, i
                        )));
                    }
                    for child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(Error::ModelLoad(format!(
                                "Tree {} node {} has invalid child index {}",
                                tree_index, i, child
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// How tree outputs are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Gradient boosting: base_score + sum of trees
    #[default]
    Sum,
    /// Random forest: average of trees
    Mean,
}

/// An ensemble of regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<RegressionTree>,
}

impl TreeEnsemble {
    fn validate(&self, n_features: usize) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::ModelLoad("Tree ensemble has no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i, n_features)?;
        }
        Ok(())
    }
}

impl Predictor for TreeEnsemble {
    fn predict(&self, row: &[f64]) -> Result<f64> {
        if row.iter().any(|x| x.is_nan()) {
            return Err(Error::Prediction("Feature row contains NaN".to_string()));
        }

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.evaluate(row)?;
        }
        Ok(match self.aggregation {
            Aggregation::Sum => self.base_score + total,
            Aggregation::Mean => total / self.trees.len() as f64,
        })
    }

    fn kind(&self) -> &'static str {
        "tree_ensemble"
    }
}

/// Model section of an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

/// On-disk model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Column order used in training
    pub features: Vec<String>,
    pub model: ModelSpec,
}

/// Summary of a loaded model (for status endpoints and the CLI)
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub kind: String,
    pub features: Vec<FeatureName>,
    pub source: Option<PathBuf>,
}

/// A validated predictor together with the feature order it expects
#[derive(Clone)]
pub struct ForecastModel {
    features: Vec<FeatureName>,
    predictor: Arc<dyn Predictor>,
    source: Option<PathBuf>,
}

impl std::fmt::Debug for ForecastModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastModel")
            .field("kind", &self.predictor.kind())
            .field("features", &self.features)
            .field("source", &self.source)
            .finish()
    }
}

impl ForecastModel {
    /// Wrap an arbitrary predictor (custom backends, tests)
    pub fn new(features: Vec<FeatureName>, predictor: Arc<dyn Predictor>) -> Self {
        Self {
            features,
            predictor,
            source: None,
        }
    }

    /// Load and validate an artifact file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::ModelLoad(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let mut model = Self::from_json(&content)?;
        model.source = Some(path.to_path_buf());
        debug!(path = %path.display(), kind = model.kind(), "Loaded forecast model");
        Ok(model)
    }

    /// Parse and validate artifact JSON
    pub fn from_json(content: &str) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(content)
            .map_err(|e| Error::ModelLoad(format!("Invalid model artifact: {}", e)))?;
        Self::from_artifact(artifact)
    }

    /// Validate an artifact against its declared features
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        let features = parse_feature_order(&artifact.features)?;

        let predictor: Arc<dyn Predictor> = match artifact.model {
            ModelSpec::Linear(linear) => {
                if linear.coefficients.len() != features.len() {
                    return Err(Error::ModelLoad(format!(
                        "Linear model has {} coefficients for {} features",
                        linear.coefficients.len(),
                        features.len()
                    )));
                }
                if !linear.intercept.is_finite()
                    || linear.coefficients.iter().any(|c| !c.is_finite())
                {
                    return Err(Error::ModelLoad(
                        "Linear model has non-finite parameters".to_string(),
                    ));
                }
                Arc::new(linear)
            }
            ModelSpec::TreeEnsemble(ensemble) => {
                ensemble.validate(features.len())?;
                Arc::new(ensemble)
            }
        };

        Ok(Self::new(features, predictor))
    }

    pub fn features(&self) -> &[FeatureName] {
        &self.features
    }

    pub fn kind(&self) -> &'static str {
        self.predictor.kind()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            kind: self.kind().to_string(),
            features: self.features.clone(),
            source: self.source.clone(),
        }
    }

    /// Predict one month. Non-finite outputs are errors, never substituted.
    pub fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let row = features.project(&self.features);
        let value = self.predictor.predict(&row)?;

        if !value.is_finite() {
            return Err(Error::Prediction(format!(
                "{} model returned a non-finite value for {:?}",
                self.kind(),
                features
            )));
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LINEAR_ARTIFACT: &str = r#"{
        "features": ["month_num", "year", "lag_1", "lag_2", "lag_3", "rolling_3"],
        "model": {
            "kind": "linear",
            "intercept": 10.0,
            "coefficients": [0.0, 0.0, 0.5, 0.25, 0.25, 0.0]
        }
    }"#;

    fn sample_features() -> FeatureVector {
        FeatureVector {
            month_num: 11,
            year: 2025,
            lag_1: 1100.0,
            lag_2: 1200.0,
            lag_3: 1000.0,
            rolling_3: 1100.0,
        }
    }

    #[test]
    fn test_linear_artifact_predicts() {
        let model = ForecastModel::from_json(LINEAR_ARTIFACT).unwrap();
        assert_eq!(model.kind(), "linear");
        assert_eq!(model.features(), FeatureName::all());

        // 10 + 550 + 300 + 250
        let value = model.predict(&sample_features()).unwrap();
        assert_eq!(value, 1110.0);
    }

    #[test]
    fn test_feature_order_is_respected() {
        // Same weights, columns declared in a different order
        let json = r#"{
            "features": ["lag_3", "lag_2", "lag_1"],
            "model": {"kind": "linear", "intercept": 0.0, "coefficients": [1.0, 0.0, 0.0]}
        }"#;
        let model = ForecastModel::from_json(json).unwrap();
        assert_eq!(model.predict(&sample_features()).unwrap(), 1000.0);
    }

    #[test]
    fn test_linear_coefficient_mismatch_rejected() {
        let json = r#"{
            "features": ["lag_1", "lag_2"],
            "model": {"kind": "linear", "coefficients": [1.0]}
        }"#;
        assert!(matches!(
            ForecastModel::from_json(json),
            Err(Error::ModelLoad(_))
        ));
    }

    #[test]
    fn test_unknown_feature_rejected() {
        let json = r#"{
            "features": ["lag_1", "day_of_week"],
            "model": {"kind": "linear", "coefficients": [1.0, 1.0]}
        }"#;
        let err = ForecastModel::from_json(json).unwrap_err();
        assert!(err.to_string().contains("day_of_week"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let json = r#"{"features": ["lag_1"], "model": {"kind": "neural_net"}}"#;
        assert!(matches!(
            ForecastModel::from_json(json),
            Err(Error::ModelLoad(_))
        ));
    }

    #[test]
    fn test_tree_ensemble_sum() {
        let json = r#"{
            "features": ["month_num", "lag_1"],
            "model": {
                "kind": "tree_ensemble",
                "aggregation": "sum",
                "base_score": 100.0,
                "trees": [
                    {"nodes": [
                        {"feature": 1, "threshold": 1000.0, "left": 1, "right": 2},
                        {"value": 5.0},
                        {"value": 50.0}
                    ]},
                    {"nodes": [
                        {"feature": 0, "threshold": 6.5, "left": 1, "right": 2},
                        {"value": -10.0},
                        {"value": 20.0}
                    ]}
                ]
            }
        }"#;
        let model = ForecastModel::from_json(json).unwrap();
        assert_eq!(model.kind(), "tree_ensemble");

        // lag_1 = 1100 > 1000 -> 50; month 11 > 6.5 -> 20
        assert_eq!(model.predict(&sample_features()).unwrap(), 170.0);
    }

    #[test]
    fn test_tree_ensemble_mean() {
        let ensemble = TreeEnsemble {
            aggregation: Aggregation::Mean,
            base_score: 0.0,
            trees: vec![
                RegressionTree {
                    nodes: vec![TreeNode::Leaf { value: 10.0 }],
                },
                RegressionTree {
                    nodes: vec![TreeNode::Leaf { value: 30.0 }],
                },
            ],
        };
        assert_eq!(ensemble.predict(&[1.0]).unwrap(), 20.0);
    }

    #[test]
    fn test_hand_built_tree_with_short_row_fails() {
        let ensemble = TreeEnsemble {
            aggregation: Aggregation::Sum,
            base_score: 0.0,
            trees: vec![RegressionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature: 4,
                        threshold: 1.0,
                        left: 1,
                        right: 2,
                    },
                    TreeNode::Leaf { value: 1.0 },
                    TreeNode::Leaf { value: 2.0 },
                ],
            }],
        };
        let model = ForecastModel::new(vec![FeatureName::Lag1], Arc::new(ensemble));

        assert!(matches!(
            model.predict(&sample_features()),
            Err(Error::Prediction(_))
        ));
    }

    #[test]
    fn test_hand_built_tree_with_bad_child_fails() {
        let ensemble = TreeEnsemble {
            aggregation: Aggregation::Sum,
            base_score: 0.0,
            trees: vec![RegressionTree {
                nodes: vec![TreeNode::Split {
                    feature: 0,
                    threshold: 1.0,
                    left: 0,
                    right: 7,
                }],
            }],
        };

        // Row value 0.5 goes left (cycle), 5.0 goes right (missing node)
        assert!(matches!(ensemble.predict(&[0.5]), Err(Error::Prediction(_))));
        assert!(matches!(ensemble.predict(&[5.0]), Err(Error::Prediction(_))));
    }

    #[test]
    fn test_tree_with_backward_child_rejected() {
        let json = r#"{
            "features": ["lag_1"],
            "model": {
                "kind": "tree_ensemble",
                "trees": [{"nodes": [
                    {"feature": 0, "threshold": 1.0, "left": 0, "right": 1},
                    {"value": 1.0}
                ]}]
            }
        }"#;
        assert!(matches!(
            ForecastModel::from_json(json),
            Err(Error::ModelLoad(_))
        ));
    }

    #[test]
    fn test_tree_with_out_of_range_feature_rejected() {
        let json = r#"{
            "features": ["lag_1"],
            "model": {
                "kind": "tree_ensemble",
                "trees": [{"nodes": [
                    {"feature": 3, "threshold": 1.0, "left": 1, "right": 2},
                    {"value": 1.0},
                    {"value": 2.0}
                ]}]
            }
        }"#;
        assert!(ForecastModel::from_json(json).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LINEAR_ARTIFACT.as_bytes()).unwrap();

        let model = ForecastModel::load(file.path()).unwrap();
        assert_eq!(model.source(), Some(file.path()));

        let summary = model.summary();
        assert_eq!(summary.kind, "linear");
        assert_eq!(summary.features.len(), 6);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ForecastModel::load(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, Error::ModelLoad(_)));
    }

    #[test]
    fn test_non_finite_prediction_is_an_error() {
        let json = r#"{
            "features": ["lag_1"],
            "model": {"kind": "linear", "coefficients": [1e308]}
        }"#;
        let model = ForecastModel::from_json(json).unwrap();
        // 1e308 * 1100 overflows to infinity
        assert!(matches!(
            model.predict(&sample_features()),
            Err(Error::Prediction(_))
        ));
    }
}
