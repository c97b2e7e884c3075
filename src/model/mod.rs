//! Model Module - classifier artifacts and probability inference

pub mod artifact;
pub mod classifier;
pub mod forest;
pub mod linear;

// Re-export common types
pub use artifact::{ArtifactInfo, ModelArtifacts};
pub use classifier::{Classifier, ProbabilisticClassifier, SerializedModel};
