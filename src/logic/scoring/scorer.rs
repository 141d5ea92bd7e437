//! Error Scorer - per-row reconstruction error

use ndarray::{Array1, ArrayView2, Axis};

use crate::error::{PipelineError, Result};

/// Mean squared difference per row
///
/// Values far outside the training range are scored as-is; a large error
/// is the detection signal, not a failure.
pub fn reconstruction_errors(normalized: ArrayView2<f64>, reconstructed: ArrayView2<f64>) -> Result<Array1<f64>> {
    if normalized.dim() != reconstructed.dim() {
        return Err(PipelineError::DimensionMismatch {
            expected: normalized.ncols(),
            actual: reconstructed.ncols(),
        });
    }
    if normalized.ncols() == 0 {
        return Err(PipelineError::DimensionMismatch { expected: 1, actual: 0 });
    }

    let d = normalized.ncols() as f64;
    let errors = (&normalized - &reconstructed)
        .mapv(|v| v * v)
        .sum_axis(Axis(1))
        / d;

    Ok(errors)
}
