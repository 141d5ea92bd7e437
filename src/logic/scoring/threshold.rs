//! Threshold Policy
//!
//! threshold = mean(errors) + multiplier * sample_std(errors)
//!
//! Computed once at training time on the held-out validation errors and
//! frozen into the bundle. Sample std (n - 1), so at least two errors are
//! required.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_THRESHOLD_MULTIPLIER;
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    /// Standard deviations above the mean
    pub multiplier: f64,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self { multiplier: DEFAULT_THRESHOLD_MULTIPLIER }
    }
}

/// Summary of the validation errors behind a threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub multiplier: f64,
    pub threshold: f64,
}

impl ThresholdPolicy {
    pub fn new(multiplier: f64) -> Result<Self> {
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(PipelineError::invalid_config(
                "threshold_multiplier",
                format!("must be finite and >= 0, got {}", multiplier),
            ));
        }
        Ok(Self { multiplier })
    }

    pub fn derive(&self, errors: &[f64]) -> Result<ThresholdStats> {
        let n = errors.len();
        if n < 2 {
            return Err(PipelineError::DegenerateSplit(format!(
                "need at least 2 validation errors for a sample std, got {}",
                n
            )));
        }
        if let Some(bad) = errors.iter().position(|e| !e.is_finite()) {
            return Err(PipelineError::DegenerateSplit(format!(
                "validation error at index {} is not finite ({})",
                bad, errors[bad]
            )));
        }

        let mean = errors.iter().sum::<f64>() / n as f64;
        let variance = errors.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let std_dev = variance.sqrt();

        let min = errors.iter().copied().fold(f64::INFINITY, f64::min);
        let max = errors.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(ThresholdStats {
            count: n,
            mean,
            std_dev,
            min,
            max,
            multiplier: self.multiplier,
            threshold: mean + self.multiplier * std_dev,
        })
    }
}

/// `mean + sample_std` with the default multiplier
pub fn derive_threshold(errors: &[f64]) -> Result<f64> {
    ThresholdPolicy::default().derive(errors).map(|s| s.threshold)
}
