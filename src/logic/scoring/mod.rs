//! Scoring Module - reconstruction error, threshold, classification
//!
//! The only part of the pipeline with a real decision in it. Everything
//! here is pure: same inputs, same outputs.
//!
//! Train/score consistency: the normalizer used in `detect` must be the
//! one fitted at training time, and the threshold must come from errors
//! produced by that same normalizer and model.

pub mod scorer;
pub mod threshold;
pub mod classifier;

pub use scorer::reconstruction_errors;
pub use threshold::{derive_threshold, ThresholdPolicy, ThresholdStats};
pub use classifier::{classify, is_anomaly};

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::logic::model::ReconstructionModel;
use crate::logic::preprocess::Normalizer;

/// Per-row scoring output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detections {
    pub errors: Vec<f64>,
    pub labels: Vec<u8>,
    pub threshold: f64,
}

impl Detections {
    pub fn anomaly_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 1).count()
    }

    pub fn anomaly_rate(&self) -> f64 {
        if self.labels.is_empty() {
            0.0
        } else {
            self.anomaly_count() as f64 / self.labels.len() as f64
        }
    }
}

/// Reconstruct already-normalized rows and score them
pub fn score_normalized<M>(model: &M, normalized: ArrayView2<f64>) -> Result<Vec<f64>>
where
    M: ReconstructionModel + ?Sized,
{
    let expected = model
        .input_dim()
        .ok_or_else(|| PipelineError::Model(format!("{} is not fitted", model.name())))?;
    if normalized.ncols() != expected {
        return Err(PipelineError::DimensionMismatch { expected, actual: normalized.ncols() });
    }

    let reconstructed = model.predict(normalized)?;
    Ok(reconstruction_errors(normalized, reconstructed.view())?.to_vec())
}

/// Validation errors → threshold
pub fn fit_threshold<M>(model: &M, validation: ArrayView2<f64>, policy: &ThresholdPolicy) -> Result<ThresholdStats>
where
    M: ReconstructionModel + ?Sized,
{
    let errors = score_normalized(model, validation)?;
    policy.derive(&errors)
}

/// Raw features → normalize (no refit) → reconstruct → score → classify
pub fn detect<N, M>(normalizer: &N, model: &M, threshold: f64, features: ArrayView2<f64>) -> Result<Detections>
where
    N: Normalizer + ?Sized,
    M: ReconstructionModel + ?Sized,
{
    let normalized = normalizer.transform(features)?;
    let errors = score_normalized(model, normalized.view())?;
    let labels = classify(&errors, threshold);

    Ok(Detections { errors, labels, threshold })
}
