//! Feature schema handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use crate::features::{DoseNumber, FeatureSchema, Manufacturer, Route, Site};

#[derive(Debug, Serialize)]
pub struct FieldOptions {
    pub manufacturer: Vec<&'static str>,
    pub dose: Vec<u8>,
    pub route: Vec<&'static str>,
    pub site: Vec<&'static str>,
}

impl FieldOptions {
    pub fn all() -> Self {
        Self {
            manufacturer: Manufacturer::ALL.iter().map(|m| m.label()).collect(),
            dose: DoseNumber::all().map(DoseNumber::get).collect(),
            route: Route::ALL.iter().map(|r| r.label()).collect(),
            site: Site::ALL.iter().map(|s| s.label()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub columns: FeatureSchema,
    pub options: FieldOptions,
}

/// Feature columns in model order and the accepted form values
pub async fn get(State(state): State<AppState>) -> Json<SchemaResponse> {
    Json(SchemaResponse {
        columns: state.engine.schema().clone(),
        options: FieldOptions::all(),
    })
}
