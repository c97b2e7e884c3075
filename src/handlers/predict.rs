//! Prediction API handler

use axum::{extract::{rejection::JsonRejection, State}, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{AppState, AppResult};
use crate::error::InvalidSelectionError;
use crate::features::{DoseNumber, FeatureRow, Selection};
use crate::inference::{RiskAssessment, RiskLevel};

/// Fields are optional so an absent value is reported as an invalid selection
#[derive(Debug, Deserialize, Validate)]
pub struct PredictRequest {
    #[validate(length(max = 64))]
    pub manufacturer: Option<String>,
    pub dose: Option<i64>,
    #[validate(length(max = 64))]
    pub route: Option<String>,
    #[validate(length(max = 64))]
    pub site: Option<String>,
    /// Include the exact feature row sent to the model
    #[serde(default)]
    pub debug: bool,
}

impl PredictRequest {
    pub fn selection(&self) -> AppResult<Selection> {
        self.validate()?;

        let dose = match self.dose {
            Some(dose) => DoseNumber::from_i64(dose)?,
            None => return Err(InvalidSelectionError::new("dose", "").into()),
        };

        Ok(Selection {
            manufacturer: field(&self.manufacturer).parse()?,
            dose,
            route: field(&self.route).parse()?,
            site: field(&self.site).parse()?,
        })
    }
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

#[derive(Debug, Serialize)]
pub struct SelectionEcho {
    pub manufacturer: &'static str,
    pub dose: u8,
    pub route: &'static str,
    pub site: &'static str,
}

impl From<&Selection> for SelectionEcho {
    fn from(s: &Selection) -> Self {
        Self {
            manufacturer: s.manufacturer.label(),
            dose: s.dose.get(),
            route: s.route.label(),
            site: s.site.label(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub id: Uuid,
    pub probability: f64,
    pub risk_percentage: f64,
    pub display_percentage: String,
    pub risk_level: RiskLevel,
    pub label: &'static str,
    pub assessed_at: DateTime<Utc>,
    pub selection: SelectionEcho,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureRow>,
}

impl PredictResponse {
    fn new(selection: &Selection, assessment: RiskAssessment, debug: bool) -> Self {
        Self {
            id: assessment.id,
            probability: assessment.probability,
            risk_percentage: assessment.risk_percentage,
            display_percentage: assessment.display_percentage(),
            risk_level: assessment.risk_level,
            label: assessment.risk_level.label(),
            assessed_at: assessment.assessed_at,
            selection: selection.into(),
            features: debug.then_some(assessment.features),
        }
    }
}

/// Score one selection
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Json(req) = payload?;
    let selection = req.selection()?;
    let assessment = state.engine.assess(&selection)?;

    Ok(Json(PredictResponse::new(&selection, assessment, req.debug)))
}
