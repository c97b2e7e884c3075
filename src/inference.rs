//! Inference Engine - risk assessment over the loaded artifacts
//!
//! [`RiskEngine`] is built once at startup and cloned into every request. It
//! never mutates the artifacts it holds.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::PredictionError;
use crate::features::{build_feature_row, FeatureRow, FeatureSchema, Selection};
use crate::model::ModelArtifacts;

/// Percentages strictly above this are high risk
pub const HIGH_RISK_CUTOFF_PERCENT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Low,
}

impl RiskLevel {
    /// `High` only when `percentage > 50.0`; exactly 50 is `Low`
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage > HIGH_RISK_CUTOFF_PERCENT {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::High => "High Risk",
            RiskLevel::Low => "Low Risk",
        }
    }
}

/// Result of one prediction
#[derive(Debug, Clone)]
pub struct RiskAssessment {
    pub id: Uuid,
    pub probability: f64,
    pub risk_percentage: f64,
    pub risk_level: RiskLevel,
    pub assessed_at: DateTime<Utc>,
    pub features: FeatureRow,
}

impl RiskAssessment {
    pub fn from_probability(probability: f64, features: FeatureRow) -> Self {
        let risk_percentage = probability * 100.0;
        Self {
            id: Uuid::new_v4(),
            probability,
            risk_percentage,
            risk_level: RiskLevel::from_percentage(risk_percentage),
            assessed_at: Utc::now(),
            features,
        }
    }

    /// Two decimals, e.g. `73.00%`
    pub fn display_percentage(&self) -> String {
        format_percentage(self.risk_percentage)
    }

    /// Whole percent for the progress bar, clamped to 0..=100
    pub fn progress(&self) -> u8 {
        self.risk_percentage.clamp(0.0, 100.0) as u8
    }
}

pub fn format_percentage(percentage: f64) -> String {
    format!("{:.2}%", percentage)
}

/// Immutable handle over the loaded model
#[derive(Debug, Clone)]
pub struct RiskEngine {
    artifacts: Arc<ModelArtifacts>,
}

impl RiskEngine {
    pub fn new(artifacts: ModelArtifacts) -> Self {
        Self { artifacts: Arc::new(artifacts) }
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.artifacts.schema
    }

    /// Encode `selection` for the loaded schema without scoring it
    pub fn feature_row(&self, selection: &Selection) -> FeatureRow {
        let row = build_feature_row(selection, &self.artifacts.schema);

        let encodings = row.encodings();
        for (field, encoding) in [
            ("manufacturer", &encodings.manufacturer),
            ("route", &encodings.route),
            ("site", &encodings.site),
        ] {
            if encoding.is_baseline() {
                tracing::debug!("{} encoded as reference level: {:?}", field, encoding);
            }
        }

        row
    }

    /// Score one selection
    pub fn assess(&self, selection: &Selection) -> Result<RiskAssessment, PredictionError> {
        let row = self.feature_row(selection);
        self.assess_row(row)
    }

    /// Score an already built row
    pub fn assess_row(&self, row: FeatureRow) -> Result<RiskAssessment, PredictionError> {
        let probability = self.artifacts.classifier.positive_probability(&row.values())?;
        let assessment = RiskAssessment::from_probability(probability, row);

        tracing::info!(
            "Assessment {}: {} ({})",
            assessment.id,
            assessment.display_percentage(),
            assessment.risk_level.label()
        );

        Ok(assessment)
    }
}
