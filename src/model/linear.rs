//! Binary logistic regression

use serde::Deserialize;

use super::classifier::ProbabilisticClassifier;
use crate::error::PredictionError;

#[derive(Debug, Clone, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    pub fn validate(&self) -> Result<(), String> {
        if self.coefficients.is_empty() {
            return Err("logistic regression has no coefficients".to_string());
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("logistic regression has non-finite weights".to_string());
        }
        Ok(())
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl ProbabilisticClassifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, PredictionError> {
        if row.len() != self.coefficients.len() {
            return Err(PredictionError::ShapeMismatch {
                expected: self.coefficients.len(),
                actual: row.len(),
            });
        }

        let z = self.intercept
            + self.coefficients.iter().zip(row).map(|(w, x)| w * x).sum::<f64>();
        let p = sigmoid(z);
        Ok(vec![1.0 - p, p])
    }
}
