//! PCA Reconstruction
//!
//! Projects rows onto the top-k principal components and back. Components
//! come from power iteration with deflation on the sample covariance, so
//! no linear algebra backend is needed. Deterministic for a fixed seed.
//!
//! Fewer than k components are kept when the data has lower rank; every
//! kept component is orthonormal to the ones before it.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::{mean_squared_error, ReconstructionModel, TrainingHistory};
use crate::error::{PipelineError, Result};

const MAX_ITERATIONS: usize = 1000;
const TOLERANCE: f64 = 1e-10;

/// Eigenvalues below this fraction of the total variance count as zero
const RANK_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcaModel {
    pub n_components: usize,
    pub seed: u64,
    pub mean: Vec<f64>,
    /// k x d, one component per row
    pub components: Array2<f64>,
    pub explained_variance: Vec<f64>,
}

impl PcaModel {
    pub fn new(n_components: usize, seed: u64) -> Self {
        Self {
            n_components,
            seed,
            mean: Vec::new(),
            components: Array2::zeros((0, 0)),
            explained_variance: Vec::new(),
        }
    }

    pub fn is_fitted(&self) -> bool {
        !self.mean.is_empty()
    }

    fn project(&self, x: ArrayView2<f64>) -> Array2<f64> {
        let mean = Array1::from(self.mean.clone());
        let centered = &x - &mean;
        let scores = centered.dot(&self.components.t());
        scores.dot(&self.components) + &mean
    }
}

/// Dominant eigenpair of a symmetric matrix
fn power_iteration(matrix: &Array2<f64>, rng: &mut StdRng) -> (f64, Array1<f64>) {
    let dim = matrix.nrows();
    let dist = Uniform::new_inclusive(-1.0_f64, 1.0);
    let mut v = Array1::from_shape_fn(dim, |_| dist.sample(&mut *rng));
    let norm = v.dot(&v).sqrt();
    if norm > 0.0 {
        v /= norm;
    }

    for _ in 0..MAX_ITERATIONS {
        let w = matrix.dot(&v);
        let norm = w.dot(&w).sqrt();
        if norm < TOLERANCE {
            return (0.0, v);
        }
        let next = w / norm;
        let delta = (&next - &v).mapv(f64::abs).sum().min((&next + &v).mapv(f64::abs).sum());
        v = next;
        if delta < TOLERANCE {
            break;
        }
    }

    let eigenvalue = v.dot(&matrix.dot(&v));
    (eigenvalue, v)
}

impl ReconstructionModel for PcaModel {
    fn fit(&mut self, x: ArrayView2<f64>, validation: Option<ArrayView2<f64>>) -> Result<TrainingHistory> {
        let (rows, dim) = x.dim();
        if rows < 2 || dim == 0 {
            return Err(PipelineError::Model(format!("cannot fit PCA on {}x{} matrix", rows, dim)));
        }
        if let Some(val) = validation {
            if val.ncols() != dim {
                return Err(PipelineError::DimensionMismatch { expected: dim, actual: val.ncols() });
            }
        }

        let k = self.n_components.min(dim);
        if k < self.n_components {
            log::warn!("PCA: {} components requested, only {} features; using {}", self.n_components, dim, k);
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| PipelineError::Model("PCA mean on empty axis".to_string()))?;
        let centered = &x - &mean;
        let mut covariance = centered.t().dot(&centered) / (rows - 1) as f64;

        let total_variance = covariance.diag().sum();
        let floor = (total_variance * RANK_TOLERANCE).max(f64::MIN_POSITIVE);

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut found: Vec<Array1<f64>> = Vec::with_capacity(k);
        let mut explained = Vec::with_capacity(k);

        for _ in 0..k {
            let (_, mut v) = power_iteration(&covariance, &mut rng);

            // Gram-Schmidt against earlier components
            for c in &found {
                let overlap = v.dot(c);
                v.scaled_add(-overlap, c);
            }
            let norm = v.dot(&v).sqrt();
            if norm < TOLERANCE {
                break;
            }
            v /= norm;

            let lambda = v.dot(&covariance.dot(&v));
            if lambda <= floor {
                break;
            }

            // Deflate
            let outer = v
                .view()
                .insert_axis(Axis(1))
                .dot(&v.view().insert_axis(Axis(0)));
            covariance = covariance - outer * lambda;

            found.push(v);
            explained.push(lambda);
        }

        if found.len() < k {
            log::info!("PCA: data rank {} is below the {} requested component(s)", found.len(), k);
        }

        let mut components = Array2::<f64>::zeros((found.len(), dim));
        for (i, v) in found.iter().enumerate() {
            components.row_mut(i).assign(v);
        }

        self.mean = mean.to_vec();
        self.components = components;
        self.explained_variance = explained;

        log::info!(
            "PCA: fitted {} component(s), explained variance {:?}",
            self.components.nrows(),
            self.explained_variance
        );

        let train_loss = mean_squared_error(&self.project(x), x);
        let val_loss = validation.map(|v| mean_squared_error(&self.project(v), v));

        Ok(TrainingHistory {
            epochs_run: 1,
            train_loss: vec![train_loss],
            val_loss: val_loss.into_iter().collect(),
            stopped_early: false,
        })
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted() {
            return Err(PipelineError::Model("PCA used before fit".to_string()));
        }
        if x.ncols() != self.mean.len() {
            return Err(PipelineError::DimensionMismatch { expected: self.mean.len(), actual: x.ncols() });
        }
        Ok(self.project(x))
    }

    fn input_dim(&self) -> Option<usize> {
        if self.is_fitted() { Some(self.mean.len()) } else { None }
    }

    fn name(&self) -> &'static str {
        "pca"
    }
}
