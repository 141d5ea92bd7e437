//! Model Module - Reconstruction models
//!
//! A reconstruction model learns to approximate the identity on normal
//! data through a compressed representation. The scoring core only sees
//! the `ReconstructionModel` trait, so implementations can be swapped.
//!
//! - `autoencoder.rs`: dense autoencoder trained with Adam on MSE
//! - `pca.rs`: linear reconstruction from the top principal components

pub mod autoencoder;
pub mod pca;

pub use autoencoder::{Autoencoder, AutoencoderParams, Activation, DenseLayer};
pub use pca::PcaModel;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::config::TrainingConfig;
use crate::error::Result;

// ============================================================================
// TRAIT
// ============================================================================

/// Fit / predict contract of a reconstruction model
pub trait ReconstructionModel {
    /// Fit on `x` as both input and target.
    ///
    /// `validation` is only evaluated (loss reporting, early stopping),
    /// never used for weight updates.
    fn fit(&mut self, x: ArrayView2<f64>, validation: Option<ArrayView2<f64>>) -> Result<TrainingHistory>;

    /// Reconstruct every row of `x`
    fn predict(&self, x: ArrayView2<f64>) -> Result<Array2<f64>>;

    /// Fitted input dimensionality, `None` before `fit`
    fn input_dim(&self) -> Option<usize>;

    fn name(&self) -> &'static str;
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Autoencoder,
    Pca,
}

/// Activation of the autoencoder's output layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputActivation {
    /// Unbounded output, matches standardized inputs
    Linear,
    /// Output squashed to (0, 1)
    Sigmoid,
}

/// Per-epoch losses reported by `fit`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub epochs_run: usize,
    pub train_loss: Vec<f64>,
    pub val_loss: Vec<f64>,
    pub stopped_early: bool,
}

impl TrainingHistory {
    pub fn final_train_loss(&self) -> Option<f64> {
        self.train_loss.last().copied()
    }

    pub fn final_val_loss(&self) -> Option<f64> {
        self.val_loss.last().copied()
    }
}

// ============================================================================
// PERSISTABLE MODEL
// ============================================================================

/// Concrete model stored in the bundle, tagged by kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reconstructor {
    Autoencoder(Autoencoder),
    Pca(PcaModel),
}

impl Reconstructor {
    pub fn from_config(config: &TrainingConfig) -> Self {
        match config.model {
            ModelKind::Autoencoder => Self::Autoencoder(Autoencoder::new(AutoencoderParams::from(config))),
            ModelKind::Pca => Self::Pca(PcaModel::new(config.pca_components, config.seed)),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Self::Autoencoder(_) => ModelKind::Autoencoder,
            Self::Pca(_) => ModelKind::Pca,
        }
    }
}

impl ReconstructionModel for Reconstructor {
    fn fit(&mut self, x: ArrayView2<f64>, validation: Option<ArrayView2<f64>>) -> Result<TrainingHistory> {
        match self {
            Self::Autoencoder(m) => m.fit(x, validation),
            Self::Pca(m) => m.fit(x, validation),
        }
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        match self {
            Self::Autoencoder(m) => m.predict(x),
            Self::Pca(m) => m.predict(x),
        }
    }

    fn input_dim(&self) -> Option<usize> {
        match self {
            Self::Autoencoder(m) => m.input_dim(),
            Self::Pca(m) => m.input_dim(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Autoencoder(m) => m.name(),
            Self::Pca(m) => m.name(),
        }
    }
}

/// Mean of squared differences over all cells
pub(crate) fn mean_squared_error(a: &Array2<f64>, b: ArrayView2<f64>) -> f64 {
    let diff = a - &b;
    diff.mapv(|d| d * d).mean().unwrap_or(0.0)
}
