//! Pipeline error taxonomy
//!
//! Every variant is fatal to the run that raised it. Messages carry the
//! stage and the file/column involved so an operator can act on them.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Data load failed for {path}: {reason}")]
    DataLoad { path: PathBuf, reason: String },

    #[error("Missing value in column '{column}' at row {row} cannot be forward-filled (no earlier value)")]
    MissingValue { column: String, row: usize },

    #[error("Degenerate split: {0}")]
    DegenerateSplit(String),

    #[error("Artifact persist failed at {path}: {reason}")]
    ArtifactPersist { path: PathBuf, reason: String },

    #[error("Artifact load failed at {path}: {reason}")]
    ArtifactLoad { path: PathBuf, reason: String },

    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {name} - {reason}")]
    InvalidConfig { name: String, reason: String },

    #[error("Model error: {0}")]
    Model(String),

    #[error("Output write failed for {path}: {reason}")]
    OutputWrite { path: PathBuf, reason: String },
}

impl PipelineError {
    pub fn data_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DataLoad { path: path.into(), reason: reason.to_string() }
    }

    pub fn persist(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArtifactPersist { path: path.into(), reason: reason.to_string() }
    }

    pub fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArtifactLoad { path: path.into(), reason: reason.to_string() }
    }

    pub fn invalid_config(name: &str, reason: impl ToString) -> Self {
        Self::InvalidConfig { name: name.to_string(), reason: reason.to_string() }
    }

    pub fn output(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::OutputWrite { path: path.into(), reason: reason.to_string() }
    }
}
