//! Logic Module - detection pipeline
//!
//! ## Layout
//! - `dataset/` - CSV ingestion, forward fill, scored output
//! - `features/` - feature layout (names + CRC32 hash) of a trained bundle
//! - `preprocess/` - `StandardScaler` and `LabelEncoder`
//! - `model/` - reconstruction models (autoencoder, PCA)
//! - `scoring/` - reconstruction error, threshold, classification
//! - `bundle/` - versioned, checksummed artifact persistence
//! - `pipeline/` - `train` and `score` orchestration

pub mod dataset;
pub mod features;
pub mod preprocess;
pub mod model;
pub mod scoring;
pub mod bundle;
pub mod pipeline;
