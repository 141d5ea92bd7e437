//! Standard scaler: (x - mean) / std per feature
//!
//! Population std (divide by n). A constant feature gets scale 1.0 so it
//! maps to 0 instead of dividing by zero.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::Normalizer;
use crate::error::{PipelineError, Result};

const MIN_SCALE: f64 = 1e-12;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    pub n_samples: usize,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        !self.mean.is_empty()
    }
}

impl Normalizer for StandardScaler {
    fn fit(&mut self, x: ArrayView2<f64>) -> Result<()> {
        let (rows, cols) = x.dim();
        if rows == 0 || cols == 0 {
            return Err(PipelineError::Model(format!(
                "cannot fit scaler on empty matrix ({}x{})",
                rows, cols
            )));
        }

        let mean: Array1<f64> = x
            .mean_axis(Axis(0))
            .ok_or_else(|| PipelineError::Model("scaler mean on empty axis".to_string()))?;
        let std = x.std_axis(Axis(0), 0.0);

        let mut constant = Vec::new();
        let scale: Vec<f64> = std
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                if s < MIN_SCALE {
                    constant.push(i);
                    1.0
                } else {
                    s
                }
            })
            .collect();

        if !constant.is_empty() {
            log::warn!("Scaler: {} constant feature(s) at index {:?}, scale set to 1.0", constant.len(), constant);
        }

        self.mean = mean.to_vec();
        self.scale = scale;
        self.n_samples = rows;
        Ok(())
    }

    fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted() {
            return Err(PipelineError::Model("scaler used before fit".to_string()));
        }
        if x.ncols() != self.mean.len() {
            return Err(PipelineError::DimensionMismatch {
                expected: self.mean.len(),
                actual: x.ncols(),
            });
        }

        let mean = Array1::from(self.mean.clone());
        let scale = Array1::from(self.scale.clone());
        Ok((&x - &mean) / &scale)
    }

    fn n_features(&self) -> Option<usize> {
        if self.is_fitted() { Some(self.mean.len()) } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_transform_zero_mean_unit_std() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let mut scaler = StandardScaler::new();
        let z = scaler.fit_transform(x.view()).unwrap();

        for col in z.columns() {
            let mean = col.mean().unwrap();
            let std = col.std(0.0);
            assert!(mean.abs() < 1e-12);
            assert!((std - 1.0).abs() < 1e-12);
        }
        assert_eq!(scaler.n_features(), Some(2));
        assert_eq!(scaler.n_samples, 3);
    }

    #[test]
    fn test_transform_reproduces_training_row() {
        let x = array![[1.0, -4.0, 0.5], [3.0, 2.0, 0.7], [5.0, 8.0, 0.2]];
        let mut scaler = StandardScaler::new();
        let fitted = scaler.fit_transform(x.view()).unwrap();

        let again = scaler.transform(x.slice(ndarray::s![1..2, ..])).unwrap();
        for j in 0..3 {
            assert!((again[[0, j]] - fitted[[1, j]]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_constant_feature_maps_to_zero() {
        let x = array![[7.0, 1.0], [7.0, 2.0]];
        let mut scaler = StandardScaler::new();
        let z = scaler.fit_transform(x.view()).unwrap();
        assert_eq!(scaler.scale[0], 1.0);
        assert_eq!(z[[0, 0]], 0.0);
        assert_eq!(z[[1, 0]], 0.0);
    }

    #[test]
    fn test_out_of_range_values_are_not_clamped() {
        let x = array![[0.0], [2.0]];
        let mut scaler = StandardScaler::new();
        scaler.fit(x.view()).unwrap();
        let z = scaler.transform(array![[101.0]].view()).unwrap();
        assert!((z[[0, 0]] - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_dimension_mismatch() {
        let mut scaler = StandardScaler::new();
        scaler.fit(array![[1.0, 2.0], [3.0, 4.0]].view()).unwrap();
        let err = scaler.transform(array![[1.0, 2.0, 3.0]].view()).unwrap_err();
        assert!(matches!(err, PipelineError::DimensionMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn test_transform_before_fit() {
        let scaler = StandardScaler::new();
        assert!(scaler.transform(array![[1.0]].view()).is_err());
        assert_eq!(scaler.n_features(), None);
    }
}
