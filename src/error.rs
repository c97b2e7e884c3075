//! Error handling

use std::path::PathBuf;

use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

/// Startup failures while reading the model or schema artifact. All fatal.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact file not found: {}", .path.display())]
    Missing { path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed artifact {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("Model and feature schema disagree: {0}")]
    SchemaMismatch(String),
}

/// A form value outside the closed option lists.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid {field} selection: {value:?}")]
pub struct InvalidSelectionError {
    pub field: &'static str,
    pub value: String,
}

impl InvalidSelectionError {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self { field, value: value.into() }
    }
}

/// Failure inside the classifier's probability call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("Feature row has {actual} columns, model expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Model produced an invalid probability: {0}")]
    InvalidOutput(String),
}

#[derive(Debug)]
pub enum AppError {
    // Input errors
    InvalidSelection(InvalidSelectionError),
    ValidationError(String),
    MalformedRequest(String),

    // Inference errors
    Prediction(PredictionError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidSelection(_)
            | AppError::ValidationError(_)
            | AppError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the user
    pub fn message(&self) -> String {
        match self {
            AppError::InvalidSelection(e) => e.to_string(),
            AppError::ValidationError(msg) => msg.clone(),
            AppError::MalformedRequest(msg) => format!("Malformed request: {}", msg),
            AppError::Prediction(e) => format!("Prediction failed: {}", e),
        }
    }

    pub(crate) fn log(&self) {
        match self {
            AppError::Prediction(e) => tracing::error!("Prediction error: {}", e),
            other => tracing::debug!("Rejected request: {}", other.message()),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();

        let body = Json(json!({
            "error": self.message(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<InvalidSelectionError> for AppError {
    fn from(err: InvalidSelectionError) -> Self {
        AppError::InvalidSelection(err)
    }
}

impl From<PredictionError> for AppError {
    fn from(err: PredictionError) -> Self {
        AppError::Prediction(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedRequest(rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::MalformedRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
