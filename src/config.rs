//! Configuration module
//!
//! Explicit configuration passed into the pipeline functions. Defaults come
//! from `constants.rs`, `from_env()` overlays environment variables, and the
//! CLI overlays its flags on top of that.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{PipelineError, Result};
use crate::logic::model::{ModelKind, OutputActivation};

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Input CSV (training or scoring)
    pub data_path: PathBuf,

    /// Directory holding the artifact bundle
    pub artifact_dir: PathBuf,

    /// Scored CSV destination
    pub output_path: PathBuf,

    /// Fraction of rows held out for the threshold (0 < ratio < 1)
    pub split_ratio: f64,

    pub split_seed: u64,

    /// threshold = mean + multiplier * sample std
    pub threshold_multiplier: f64,

    pub label_column: String,

    pub training: TrainingConfig,
}

/// Reconstruction model hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub model: ModelKind,
    pub hidden_layers: Vec<usize>,
    pub output_activation: OutputActivation,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Stop after this many epochs without validation improvement
    pub patience: Option<usize>,
    pub seed: u64,
    pub pca_components: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::Autoencoder,
            hidden_layers: DEFAULT_HIDDEN_LAYERS.to_vec(),
            output_activation: OutputActivation::Linear,
            epochs: DEFAULT_EPOCHS,
            batch_size: DEFAULT_BATCH_SIZE,
            learning_rate: DEFAULT_LEARNING_RATE,
            patience: None,
            seed: DEFAULT_MODEL_SEED,
            pca_components: DEFAULT_PCA_COMPONENTS,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            split_ratio: DEFAULT_SPLIT_RATIO,
            split_seed: DEFAULT_SPLIT_SEED,
            threshold_multiplier: DEFAULT_THRESHOLD_MULTIPLIER,
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            training: TrainingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables
    ///
    /// Unset variables keep their defaults; a set but unparsable variable is
    /// an `InvalidConfig` error rather than a silent fallback.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(path) = env::var(ENV_DATA_PATH) {
            config.data_path = PathBuf::from(path);
        }
        if let Ok(dir) = env::var(ENV_ARTIFACT_DIR) {
            config.artifact_dir = PathBuf::from(dir);
        }
        if let Ok(path) = env::var(ENV_OUTPUT_PATH) {
            config.output_path = PathBuf::from(path);
        }
        if let Ok(label) = env::var(ENV_LABEL_COLUMN) {
            config.label_column = label;
        }
        if let Some(ratio) = parse_env(ENV_SPLIT_RATIO)? {
            config.split_ratio = ratio;
        }
        if let Some(seed) = parse_env(ENV_SPLIT_SEED)? {
            config.split_seed = seed;
        }
        if let Some(multiplier) = parse_env(ENV_THRESHOLD_MULTIPLIER)? {
            config.threshold_multiplier = multiplier;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.split_ratio > 0.0 && self.split_ratio < 1.0) {
            return Err(PipelineError::invalid_config(
                "split_ratio",
                format!("must be in (0, 1), got {}", self.split_ratio),
            ));
        }
        if !self.threshold_multiplier.is_finite() || self.threshold_multiplier < 0.0 {
            return Err(PipelineError::invalid_config(
                "threshold_multiplier",
                format!("must be finite and >= 0, got {}", self.threshold_multiplier),
            ));
        }
        if self.label_column.trim().is_empty() {
            return Err(PipelineError::invalid_config("label_column", "must not be empty"));
        }
        self.training.validate()
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(PipelineError::invalid_config("epochs", "must be > 0"));
        }
        if self.batch_size == 0 {
            return Err(PipelineError::invalid_config("batch_size", "must be > 0"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(PipelineError::invalid_config(
                "learning_rate",
                format!("must be finite and > 0, got {}", self.learning_rate),
            ));
        }
        match self.model {
            ModelKind::Autoencoder => {
                if self.hidden_layers.is_empty() || self.hidden_layers.contains(&0) {
                    return Err(PipelineError::invalid_config(
                        "hidden_layers",
                        "need at least one layer and every width > 0",
                    ));
                }
            }
            ModelKind::Pca => {
                if self.pca_components == 0 {
                    return Err(PipelineError::invalid_config("pca_components", "must be > 0"));
                }
            }
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| PipelineError::invalid_config(name, format!("'{}': {}", raw, e))),
        Err(_) => Ok(None),
    }
}
