//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! `config.rs` reads the environment and falls back to these values.

/// Default training / scoring input
pub const DEFAULT_DATA_PATH: &str = "data/bin_data.csv";

/// Default artifact bundle directory
pub const DEFAULT_ARTIFACT_DIR: &str = "models";

/// Default scored output file
pub const DEFAULT_OUTPUT_PATH: &str = "anomaly_scores.csv";

/// Name of the label column in input tables
pub const DEFAULT_LABEL_COLUMN: &str = "label";

/// Fraction of rows held out for threshold derivation
pub const DEFAULT_SPLIT_RATIO: f64 = 0.2;

/// Seed for the fit/validation split
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// threshold = mean + multiplier * sample std
pub const DEFAULT_THRESHOLD_MULTIPLIER: f64 = 1.0;

// ============================================
// Model defaults
// ============================================

/// Hidden layer widths of the autoencoder (encoder → bottleneck → decoder)
pub const DEFAULT_HIDDEN_LAYERS: [usize; 3] = [64, 32, 64];

pub const DEFAULT_EPOCHS: usize = 50;
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Adam default step size
pub const DEFAULT_LEARNING_RATE: f64 = 1e-3;

/// Seed for weight init and mini-batch shuffling
pub const DEFAULT_MODEL_SEED: u64 = 42;

/// Principal components kept by the PCA reconstructor
pub const DEFAULT_PCA_COMPONENTS: usize = 2;

// ============================================
// Output columns
// ============================================

pub const ERROR_COLUMN: &str = "reconstruction_error";
pub const PREDICTION_COLUMN: &str = "predicted_label";

// ============================================
// Environment variables
// ============================================

pub const ENV_DATA_PATH: &str = "ANOMALY_DATA_PATH";
pub const ENV_ARTIFACT_DIR: &str = "ANOMALY_ARTIFACT_DIR";
pub const ENV_OUTPUT_PATH: &str = "ANOMALY_OUTPUT_PATH";
pub const ENV_SPLIT_RATIO: &str = "ANOMALY_SPLIT_RATIO";
pub const ENV_SPLIT_SEED: &str = "ANOMALY_SPLIT_SEED";
pub const ENV_THRESHOLD_MULTIPLIER: &str = "ANOMALY_THRESHOLD_MULTIPLIER";
pub const ENV_LABEL_COLUMN: &str = "ANOMALY_LABEL_COLUMN";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
