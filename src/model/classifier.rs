//! Classifier handle: the "probability given a row" capability

use serde::Deserialize;

use super::forest::RandomForest;
use super::linear::LogisticRegression;
use crate::error::PredictionError;

/// Label of the serious-event class
pub const POSITIVE_CLASS: i64 = 1;

/// Trait for estimators able to score one feature row
pub trait ProbabilisticClassifier: Send + Sync {
    /// Width of the rows the estimator accepts
    fn n_features(&self) -> usize;

    /// Per-class probabilities, in the model's class order
    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, PredictionError>;
}

/// Serialized estimator, tagged by `kind`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

impl Estimator {
    pub fn kind(&self) -> &'static str {
        match self {
            Estimator::RandomForest(_) => "random_forest",
            Estimator::LogisticRegression(_) => "logistic_regression",
        }
    }
}

/// On-disk model document
#[derive(Debug, Clone, Deserialize)]
pub struct SerializedModel {
    #[serde(default)]
    pub description: Option<String>,
    pub classes: Vec<i64>,
    #[serde(default)]
    pub n_features: Option<usize>,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    #[serde(flatten)]
    pub estimator: Estimator,
}

/// Validated, immutable classifier
pub struct Classifier {
    kind: &'static str,
    description: String,
    feature_names: Option<Vec<String>>,
    positive_index: usize,
    estimator: Box<dyn ProbabilisticClassifier>,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("kind", &self.kind)
            .field("description", &self.description)
            .field("n_features", &self.estimator.n_features())
            .field("positive_index", &self.positive_index)
            .finish()
    }
}

fn positive_index(classes: &[i64]) -> Result<usize, String> {
    if classes.len() != 2 {
        return Err(format!("expected 2 classes, found {}", classes.len()));
    }
    classes
        .iter()
        .position(|c| *c == POSITIVE_CLASS)
        .ok_or_else(|| format!("classes {:?} do not include {}", classes, POSITIVE_CLASS))
}

impl Classifier {
    /// Wrap any estimator. `classes` gives the label of each probability slot.
    pub fn new(
        kind: &'static str,
        description: impl Into<String>,
        classes: &[i64],
        estimator: Box<dyn ProbabilisticClassifier>,
    ) -> Result<Self, String> {
        Ok(Self {
            kind,
            description: description.into(),
            feature_names: None,
            positive_index: positive_index(classes)?,
            estimator,
        })
    }

    /// Validate a deserialized model document
    pub fn from_serialized(model: SerializedModel) -> Result<Self, String> {
        let SerializedModel { description, classes, n_features, feature_names, estimator } = model;

        let positive_index = positive_index(&classes)?;
        let kind = estimator.kind();

        let estimator: Box<dyn ProbabilisticClassifier> = match estimator {
            Estimator::RandomForest(mut forest) => {
                let width = n_features
                    .or_else(|| feature_names.as_ref().map(Vec::len))
                    .ok_or("random_forest requires n_features or feature_names")?;
                forest.validate(width, classes.len())?;
                Box::new(forest)
            }
            Estimator::LogisticRegression(linear) => {
                linear.validate()?;
                Box::new(linear)
            }
        };

        let width = estimator.n_features();
        if let Some(declared) = n_features {
            if declared != width {
                return Err(format!("n_features is {} but estimator takes {}", declared, width));
            }
        }
        if let Some(names) = &feature_names {
            if names.len() != width {
                return Err(format!("{} feature_names for {} features", names.len(), width));
            }
        }

        Ok(Self {
            kind,
            description: description.unwrap_or_else(|| default_description(kind)),
            feature_names,
            positive_index,
            estimator,
        })
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn n_features(&self) -> usize {
        self.estimator.n_features()
    }

    /// Training-time column names, if the artifact recorded them
    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    /// Probability of the serious-event class for one row
    pub fn positive_probability(&self, row: &[f64]) -> Result<f64, PredictionError> {
        if row.len() != self.n_features() {
            return Err(PredictionError::ShapeMismatch {
                expected: self.n_features(),
                actual: row.len(),
            });
        }

        let proba = self.estimator.predict_proba(row)?;
        let p = proba.get(self.positive_index).copied().ok_or_else(|| {
            PredictionError::InvalidOutput(format!("{} class probabilities returned", proba.len()))
        })?;

        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(PredictionError::InvalidOutput(p.to_string()));
        }
        Ok(p)
    }
}

fn default_description(kind: &str) -> String {
    match kind {
        "random_forest" => "Random Forest model trained on VAERS data.".to_string(),
        other => format!("{} model trained on VAERS data.", other.replace('_', " ")),
    }
}
