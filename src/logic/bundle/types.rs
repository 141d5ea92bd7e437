use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::APP_VERSION;
use crate::logic::features::FeatureLayout;
use crate::logic::model::{ModelKind, Reconstructor};
use crate::logic::preprocess::{LabelEncoder, StandardScaler};
use crate::logic::scoring::ThresholdStats;

/// Bump when the on-disk layout of the bundle changes
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

pub const NORMALIZER_FILE: &str = "normalizer.json";
pub const LABEL_ENCODER_FILE: &str = "label_encoder.json";
pub const MODEL_FILE: &str = "model.json";
pub const THRESHOLD_FILE: &str = "threshold.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Files that must all be present and match their checksums
pub const REQUIRED_ARTIFACTS: [&str; 4] = [NORMALIZER_FILE, LABEL_ENCODER_FILE, MODEL_FILE, THRESHOLD_FILE];

// ============================================================================
// THRESHOLD ARTIFACT
// ============================================================================

/// `threshold.json`: `{"threshold": <f64>}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdArtifact {
    pub threshold: f64,
}

// ============================================================================
// MANIFEST
// ============================================================================

/// Written last; its presence marks a complete bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleManifest {
    pub format_version: u32,
    pub bundle_id: String,
    pub created_at: DateTime<Utc>,
    pub app_version: String,
    pub model_kind: ModelKind,
    pub layout: FeatureLayout,
    pub validation: ThresholdStats,
    /// artifact file → SHA-256 hex
    pub checksums: BTreeMap<String, String>,
}

impl BundleManifest {
    pub fn new(model_kind: ModelKind, layout: FeatureLayout, validation: ThresholdStats) -> Self {
        Self {
            format_version: BUNDLE_FORMAT_VERSION,
            bundle_id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            app_version: APP_VERSION.to_string(),
            model_kind,
            layout,
            validation,
            checksums: BTreeMap::new(),
        }
    }
}

// ============================================================================
// BUNDLE
// ============================================================================

/// Everything needed to reproduce scoring behavior
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub manifest: BundleManifest,
    pub normalizer: StandardScaler,
    pub label_encoder: LabelEncoder,
    pub model: Reconstructor,
    pub threshold: f64,
}

impl ArtifactBundle {
    pub fn new(
        layout: FeatureLayout,
        normalizer: StandardScaler,
        label_encoder: LabelEncoder,
        model: Reconstructor,
        validation: ThresholdStats,
    ) -> Self {
        let threshold = validation.threshold;
        Self {
            manifest: BundleManifest::new(model.kind(), layout, validation),
            normalizer,
            label_encoder,
            model,
            threshold,
        }
    }

    pub fn id(&self) -> &str {
        &self.manifest.bundle_id
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.manifest.layout
    }
}
