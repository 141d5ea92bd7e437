//! Feature Layout - schema of a trained bundle
//!
//! The training table fixes which columns are features and in what order.
//! That layout travels inside the bundle and scoring data is checked
//! against it before anything is transformed.
//!
//! ## Rules
//! 1. Feature count must match exactly → otherwise `DimensionMismatch`
//! 2. Feature names must match as a set → otherwise `DataLoad`
//! 3. Column order in the scoring file is free; columns are picked by name

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::logic::dataset::Dataset;

/// Layout format version, part of the hash
pub const LAYOUT_VERSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureLayout {
    pub version: u8,
    pub label_column: String,
    /// Feature names in the order the normalizer and model expect
    pub feature_names: Vec<String>,
    /// CRC32 of version + ordered names
    pub layout_hash: u32,
}

impl FeatureLayout {
    pub fn new(label_column: &str, feature_names: Vec<String>) -> Self {
        let layout_hash = compute_layout_hash(&feature_names);
        Self {
            version: LAYOUT_VERSION,
            label_column: label_column.to_string(),
            feature_names,
            layout_hash,
        }
    }

    /// Layout of a training table: every column except the label
    pub fn from_training(dataset: &Dataset, label_column: &str) -> Result<Self> {
        if !dataset.has_column(label_column) {
            return Err(PipelineError::data_load(
                dataset.source(),
                format!("no label column '{}'", label_column),
            ));
        }

        let features = dataset.feature_columns(label_column);
        if features.is_empty() {
            return Err(PipelineError::data_load(dataset.source(), "no feature columns besides the label"));
        }

        Ok(Self::new(label_column, features))
    }

    pub fn dim(&self) -> usize {
        self.feature_names.len()
    }

    /// Internal consistency (hash matches names)
    pub fn is_consistent(&self) -> bool {
        self.version == LAYOUT_VERSION && self.layout_hash == compute_layout_hash(&self.feature_names)
    }

    /// Check a scoring table against this layout
    ///
    /// The label column is optional. Both the training label name and
    /// `label_column` are treated as labels, unless `label_column` names a
    /// trained feature. Returns the feature names to extract, in layout order.
    pub fn validate_dataset(&self, dataset: &Dataset, label_column: &str) -> Result<&[String]> {
        let is_label = |name: &str| {
            name == self.label_column || (name == label_column && !self.feature_names.iter().any(|f| f == name))
        };
        let incoming: Vec<String> = dataset.headers.iter().filter(|h| !is_label(h.as_str())).cloned().collect();

        if incoming.len() != self.dim() {
            return Err(PipelineError::DimensionMismatch {
                expected: self.dim(),
                actual: incoming.len(),
            });
        }

        let missing: Vec<&str> = self
            .feature_names
            .iter()
            .filter(|name| !incoming.contains(*name))
            .map(String::as_str)
            .collect();

        if !missing.is_empty() {
            return Err(PipelineError::data_load(
                dataset.source(),
                format!("feature columns not found: {}", missing.join(", ")),
            ));
        }

        Ok(&self.feature_names)
    }
}

/// CRC32 over the layout version and ordered feature names
pub fn compute_layout_hash(feature_names: &[String]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[LAYOUT_VERSION]);

    for name in feature_names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}
