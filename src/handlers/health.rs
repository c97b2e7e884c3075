//! Health check handler

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    environment: String,
    model: ModelStatus,
}

#[derive(Serialize)]
pub struct ModelStatus {
    kind: &'static str,
    description: String,
    n_features: usize,
    fingerprint: String,
    loaded_at: DateTime<Utc>,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let artifacts = state.engine.artifacts();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().timestamp(),
        environment: state.config.environment.clone(),
        model: ModelStatus {
            kind: artifacts.classifier.kind(),
            description: artifacts.classifier.description().to_string(),
            n_features: artifacts.schema.len(),
            fingerprint: artifacts.info.fingerprint.clone(),
            loaded_at: artifacts.info.loaded_at,
        },
    })
}
