//! Reconstruction-error anomaly detection for tabular sensor data
//!
//! Training fits a normalizer and a reconstruction model on labeled rows,
//! derives a threshold from held-out reconstruction errors and publishes
//! everything as one bundle. Scoring reloads the bundle and flags rows
//! whose error exceeds the threshold.

pub mod config;
pub mod constants;
pub mod error;
pub mod logic;

pub use config::{PipelineConfig, TrainingConfig};
pub use error::{PipelineError, Result};
pub use logic::pipeline::{score, train, ScoringSummary, TrainingSummary};
