//! Bundle Module - versioned artifact persistence
//!
//! A bundle is one directory holding everything scoring needs:
//!
//! ```text
//! models/
//!   normalizer.json      fitted StandardScaler
//!   label_encoder.json   label classes
//!   model.json           reconstruction model weights (tagged by kind)
//!   threshold.json       {"threshold": f64}
//!   manifest.json        layout, validation stats, SHA-256 per artifact
//! ```
//!
//! Publishing goes through a staging directory and a rename, so a reader
//! sees either the previous bundle or the new one, never a mix.

pub mod types;
pub mod validate;
pub mod storage;

#[cfg(test)]
mod tests;

pub use types::{
    ArtifactBundle, BundleManifest, ThresholdArtifact, BUNDLE_FORMAT_VERSION, LABEL_ENCODER_FILE,
    MANIFEST_FILE, MODEL_FILE, NORMALIZER_FILE, REQUIRED_ARTIFACTS, THRESHOLD_FILE,
};
pub use validate::validate_bundle;
pub use storage::{load_bundle, save_bundle, sha256_hex};
