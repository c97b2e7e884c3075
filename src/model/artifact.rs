//! Artifact loading
//!
//! Reads the classifier and the feature-column list once at startup and checks
//! that they describe the same row layout. Any failure is fatal.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::classifier::{Classifier, SerializedModel};
use crate::error::ArtifactError;
use crate::features::FeatureSchema;

/// Where the artifacts came from
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInfo {
    pub model_path: PathBuf,
    pub feature_columns_path: PathBuf,
    /// SHA-256 of the model file, hex
    pub fingerprint: String,
    pub loaded_at: DateTime<Utc>,
}

/// Classifier plus the schema its rows must follow
#[derive(Debug)]
pub struct ModelArtifacts {
    pub classifier: Classifier,
    pub schema: FeatureSchema,
    pub info: ArtifactInfo,
}

impl ModelArtifacts {
    /// Load both artifacts. A missing file yields [`ArtifactError::Missing`].
    pub fn load(model_path: &Path, feature_columns_path: &Path) -> Result<Self, ArtifactError> {
        tracing::info!("Loading model artifact from: {}", model_path.display());

        let model_bytes = read_artifact(model_path)?;
        let fingerprint = format!("{:x}", Sha256::digest(&model_bytes));

        let document: SerializedModel = serde_json::from_slice(&model_bytes)
            .map_err(|e| malformed(model_path, e.to_string()))?;
        let classifier = Classifier::from_serialized(document)
            .map_err(|reason| malformed(model_path, reason))?;

        tracing::info!("Loading feature columns from: {}", feature_columns_path.display());
        let schema = load_schema(feature_columns_path)?;

        let artifacts = Self::assemble(
            classifier,
            schema,
            ArtifactInfo {
                model_path: model_path.to_path_buf(),
                feature_columns_path: feature_columns_path.to_path_buf(),
                fingerprint,
                loaded_at: Utc::now(),
            },
        )?;

        tracing::info!(
            "Model loaded: {} ({} features, sha256 {})",
            artifacts.classifier.kind(),
            artifacts.schema.len(),
            &artifacts.info.fingerprint[..12]
        );

        Ok(artifacts)
    }

    /// Pair a classifier with a schema, checking they agree on the row layout
    pub fn assemble(
        classifier: Classifier,
        schema: FeatureSchema,
        info: ArtifactInfo,
    ) -> Result<Self, ArtifactError> {
        check_alignment(&classifier, &schema)?;
        Ok(Self { classifier, schema, info })
    }
}

fn read_artifact(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::Missing { path: path.to_path_buf() }
        } else {
            ArtifactError::Io { path: path.to_path_buf(), source }
        }
    })
}

fn malformed(path: &Path, reason: String) -> ArtifactError {
    ArtifactError::Malformed { path: path.to_path_buf(), reason }
}

/// Read a JSON array of column names
pub fn load_schema(path: &Path) -> Result<FeatureSchema, ArtifactError> {
    let bytes = read_artifact(path)?;
    let columns: Vec<String> = serde_json::from_slice(&bytes)
        .map_err(|e| malformed(path, e.to_string()))?;
    FeatureSchema::new(columns).map_err(|reason| malformed(path, reason))
}

fn check_alignment(classifier: &Classifier, schema: &FeatureSchema) -> Result<(), ArtifactError> {
    if classifier.n_features() != schema.len() {
        return Err(ArtifactError::SchemaMismatch(format!(
            "model takes {} features, schema lists {}",
            classifier.n_features(),
            schema.len()
        )));
    }

    if let Some(names) = classifier.feature_names() {
        if let Some((i, (trained, listed))) = names
            .iter()
            .zip(schema.columns())
            .enumerate()
            .find(|(_, (a, b))| a != b)
        {
            return Err(ArtifactError::SchemaMismatch(format!(
                "column {} is {:?} in the model but {:?} in the schema",
                i, trained, listed
            )));
        }
    }

    Ok(())
}
