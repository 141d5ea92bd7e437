//! Pipeline Module - training and scoring orchestration
//!
//! Both modes are linear and stop at the first failure:
//!
//! - `train`: load → forward-fill → encode labels → fit normalizer → split
//!   → fit model → threshold from validation errors → publish bundle
//! - `score`: load bundle → load data → forward-fill → check layout →
//!   normalize (no refit) → reconstruct → classify → write scored CSV
//!
//! Configuration is passed in explicitly; nothing here reads the
//! environment.

pub mod train;
pub mod score;


pub use train::{fit_model, split_indices, train, SplitSizes};
pub use score::score;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::logic::model::ModelKind;
use crate::logic::scoring::ThresholdStats;

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub bundle_id: String,
    pub artifact_dir: PathBuf,
    pub model_kind: ModelKind,
    pub rows: usize,
    pub features: usize,
    pub split: SplitSizes,
    pub label_classes: Vec<String>,
    pub threshold: ThresholdStats,
    pub epochs_run: usize,
    pub stopped_early: bool,
    pub final_train_loss: Option<f64>,
    pub final_val_loss: Option<f64>,
}

/// Result of a scoring run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringSummary {
    pub bundle_id: String,
    pub rows: usize,
    pub anomalies: usize,
    pub anomaly_rate: f64,
    pub threshold: f64,
    pub output_path: PathBuf,
}
