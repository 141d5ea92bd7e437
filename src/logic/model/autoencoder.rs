//! Dense Autoencoder
//!
//! Fully connected network `d → h1 → … → hk → d` with ReLU hidden layers,
//! trained on mean squared error with Adam. Weight init (Glorot uniform)
//! and mini-batch order come from a seeded RNG so a fixed seed and fixed
//! data give the same weights on every run.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::{mean_squared_error, OutputActivation, ReconstructionModel, TrainingHistory};
use crate::config::TrainingConfig;
use crate::error::{PipelineError, Result};

// Adam
const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const EPSILON: f64 = 1e-7;

/// Smallest validation loss drop that counts as an improvement
const MIN_DELTA: f64 = 1e-9;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    Sigmoid,
    Linear,
}

impl Activation {
    fn apply(self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => z.mapv(|v| v.max(0.0)),
            Activation::Sigmoid => z.mapv(|v| 1.0 / (1.0 + (-v).exp())),
            Activation::Linear => z.clone(),
        }
    }

    /// d(activation)/dz, from pre-activation `z` and output `a`
    fn derivative(self, z: &Array2<f64>, a: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => z.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Activation::Sigmoid => a.mapv(|s| s * (1.0 - s)),
            Activation::Linear => Array2::ones(z.raw_dim()),
        }
    }
}

impl From<OutputActivation> for Activation {
    fn from(value: OutputActivation) -> Self {
        match value {
            OutputActivation::Linear => Activation::Linear,
            OutputActivation::Sigmoid => Activation::Sigmoid,
        }
    }
}

/// One fully connected layer, `weights` is `fan_in x fan_out`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Array2<f64>,
    pub bias: Array1<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    fn glorot(fan_in: usize, fan_out: usize, activation: Activation, rng: &mut StdRng) -> Self {
        let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
        let dist = Uniform::new_inclusive(-limit, limit);
        let weights = Array2::from_shape_fn((fan_in, fan_out), |_| dist.sample(&mut *rng));

        Self {
            weights,
            bias: Array1::zeros(fan_out),
            activation,
        }
    }
}

/// Training hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoencoderParams {
    pub hidden_layers: Vec<usize>,
    pub output_activation: OutputActivation,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub patience: Option<usize>,
    pub seed: u64,
}

impl From<&TrainingConfig> for AutoencoderParams {
    fn from(config: &TrainingConfig) -> Self {
        Self {
            hidden_layers: config.hidden_layers.clone(),
            output_activation: config.output_activation,
            epochs: config.epochs,
            batch_size: config.batch_size,
            learning_rate: config.learning_rate,
            patience: config.patience,
            seed: config.seed,
        }
    }
}

impl Default for AutoencoderParams {
    fn default() -> Self {
        Self::from(&TrainingConfig::default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Autoencoder {
    pub params: AutoencoderParams,
    pub input_dim: usize,
    /// Empty until fitted
    pub layers: Vec<DenseLayer>,
}

/// Adam moment estimates for one layer
struct AdamState {
    m_w: Array2<f64>,
    v_w: Array2<f64>,
    m_b: Array1<f64>,
    v_b: Array1<f64>,
}

/// Forward pass cache: `inputs[i]` feeds layer i, `outputs[i]` leaves it
struct ForwardCache {
    inputs: Vec<Array2<f64>>,
    pre_activations: Vec<Array2<f64>>,
    outputs: Vec<Array2<f64>>,
}

// ============================================================================
// IMPLEMENTATION
// ============================================================================

impl Autoencoder {
    pub fn new(params: AutoencoderParams) -> Self {
        Self {
            params,
            input_dim: 0,
            layers: Vec::new(),
        }
    }

    pub fn is_fitted(&self) -> bool {
        !self.layers.is_empty()
    }

    fn init_layers(&mut self, input_dim: usize, rng: &mut StdRng) {
        let mut widths = Vec::with_capacity(self.params.hidden_layers.len() + 2);
        widths.push(input_dim);
        widths.extend_from_slice(&self.params.hidden_layers);
        widths.push(input_dim);

        let last = widths.len() - 2;
        self.layers = widths
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                let activation = if i == last {
                    Activation::from(self.params.output_activation)
                } else {
                    Activation::Relu
                };
                DenseLayer::glorot(pair[0], pair[1], activation, rng)
            })
            .collect();
        self.input_dim = input_dim;
    }

    fn forward(&self, x: ArrayView2<f64>) -> ForwardCache {
        let mut cache = ForwardCache {
            inputs: Vec::with_capacity(self.layers.len()),
            pre_activations: Vec::with_capacity(self.layers.len()),
            outputs: Vec::with_capacity(self.layers.len()),
        };

        let mut current = x.to_owned();
        for layer in &self.layers {
            let z = current.dot(&layer.weights) + &layer.bias;
            let a = layer.activation.apply(&z);
            cache.inputs.push(current);
            cache.pre_activations.push(z);
            current = a.clone();
            cache.outputs.push(a);
        }

        cache
    }

    fn reconstruct(&self, x: ArrayView2<f64>) -> Array2<f64> {
        let mut current = x.to_owned();
        for layer in &self.layers {
            let z = current.dot(&layer.weights) + &layer.bias;
            current = layer.activation.apply(&z);
        }
        current
    }

    /// One Adam step on a mini-batch; returns the batch loss before the step
    fn train_batch(&mut self, batch: ArrayView2<f64>, adam: &mut [AdamState], step: i32) -> f64 {
        let cache = self.forward(batch);
        let output = cache.outputs.last().cloned().unwrap_or_else(|| batch.to_owned());

        let diff = &output - &batch;
        let loss = diff.mapv(|d| d * d).mean().unwrap_or(0.0);

        // dL/d(output) for mean over all cells
        let mut grad = diff * (2.0 / batch.len() as f64);

        let lr = self.params.learning_rate;
        let bias_c1 = 1.0 - BETA1.powi(step);
        let bias_c2 = 1.0 - BETA2.powi(step);

        for i in (0..self.layers.len()).rev() {
            let layer = &self.layers[i];
            let delta = grad * layer.activation.derivative(&cache.pre_activations[i], &cache.outputs[i]);

            let grad_w = cache.inputs[i].t().dot(&delta);
            let grad_b = delta.sum_axis(Axis(0));

            // Propagate before the weights move
            grad = delta.dot(&layer.weights.t());

            let state = &mut adam[i];
            state.m_w = &state.m_w * BETA1 + &grad_w * (1.0 - BETA1);
            state.v_w = &state.v_w * BETA2 + &grad_w.mapv(|g| g * g) * (1.0 - BETA2);
            state.m_b = &state.m_b * BETA1 + &grad_b * (1.0 - BETA1);
            state.v_b = &state.v_b * BETA2 + &grad_b.mapv(|g| g * g) * (1.0 - BETA2);

            let layer = &mut self.layers[i];
            ndarray::Zip::from(&mut layer.weights)
                .and(&state.m_w)
                .and(&state.v_w)
                .for_each(|w, &m, &v| {
                    *w -= lr * (m / bias_c1) / ((v / bias_c2).sqrt() + EPSILON);
                });
            ndarray::Zip::from(&mut layer.bias)
                .and(&state.m_b)
                .and(&state.v_b)
                .for_each(|b, &m, &v| {
                    *b -= lr * (m / bias_c1) / ((v / bias_c2).sqrt() + EPSILON);
                });
        }

        loss
    }
}

impl ReconstructionModel for Autoencoder {
    fn fit(&mut self, x: ArrayView2<f64>, validation: Option<ArrayView2<f64>>) -> Result<TrainingHistory> {
        let (rows, dim) = x.dim();
        if rows == 0 || dim == 0 {
            return Err(PipelineError::Model(format!("cannot fit autoencoder on {}x{} matrix", rows, dim)));
        }
        if let Some(val) = validation {
            if val.ncols() != dim {
                return Err(PipelineError::DimensionMismatch { expected: dim, actual: val.ncols() });
            }
        }

        let mut rng = StdRng::seed_from_u64(self.params.seed);
        self.init_layers(dim, &mut rng);

        let mut adam: Vec<AdamState> = self
            .layers
            .iter()
            .map(|l| AdamState {
                m_w: Array2::zeros(l.weights.raw_dim()),
                v_w: Array2::zeros(l.weights.raw_dim()),
                m_b: Array1::zeros(l.bias.raw_dim()),
                v_b: Array1::zeros(l.bias.raw_dim()),
            })
            .collect();

        log::info!(
            "Autoencoder: fitting {}x{} (layers {:?}, epochs {}, batch {})",
            rows, dim, self.params.hidden_layers, self.params.epochs, self.params.batch_size
        );

        let mut history = TrainingHistory::default();
        let mut order: Vec<usize> = (0..rows).collect();
        let mut step: i32 = 0;
        let mut best: Option<(f64, Vec<DenseLayer>)> = None;
        let mut stale_epochs = 0usize;

        for epoch in 0..self.params.epochs {
            order.shuffle(&mut rng);

            let mut weighted_loss = 0.0;
            for chunk in order.chunks(self.params.batch_size) {
                let batch = x.select(Axis(0), chunk);
                step = step.saturating_add(1);
                weighted_loss += self.train_batch(batch.view(), &mut adam, step) * chunk.len() as f64;
            }
            let train_loss = weighted_loss / rows as f64;
            history.train_loss.push(train_loss);
            history.epochs_run = epoch + 1;

            if let Some(val) = validation {
                let val_loss = mean_squared_error(&self.reconstruct(val), val);
                history.val_loss.push(val_loss);
                log::debug!("epoch {}/{}: loss {:.6} val_loss {:.6}", epoch + 1, self.params.epochs, train_loss, val_loss);

                if let Some(patience) = self.params.patience {
                    let improved = best.as_ref().map_or(true, |(b, _)| val_loss < *b - MIN_DELTA);
                    if improved {
                        best = Some((val_loss, self.layers.clone()));
                        stale_epochs = 0;
                    } else {
                        stale_epochs += 1;
                        if stale_epochs >= patience {
                            log::info!("Autoencoder: early stop after epoch {} (no improvement in {})", epoch + 1, patience);
                            history.stopped_early = true;
                            break;
                        }
                    }
                }
            } else {
                log::debug!("epoch {}/{}: loss {:.6}", epoch + 1, self.params.epochs, train_loss);
            }

            if !train_loss.is_finite() {
                return Err(PipelineError::Model(format!("training diverged at epoch {} (loss {})", epoch + 1, train_loss)));
            }
        }

        if history.stopped_early {
            if let Some((_, layers)) = best {
                self.layers = layers;
            }
        }

        log::info!(
            "Autoencoder: done after {} epoch(s), loss {:.6}",
            history.epochs_run,
            history.final_train_loss().unwrap_or(f64::NAN)
        );

        Ok(history)
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted() {
            return Err(PipelineError::Model("autoencoder used before fit".to_string()));
        }
        if x.ncols() != self.input_dim {
            return Err(PipelineError::DimensionMismatch { expected: self.input_dim, actual: x.ncols() });
        }
        Ok(self.reconstruct(x))
    }

    fn input_dim(&self) -> Option<usize> {
        if self.is_fitted() { Some(self.input_dim) } else { None }
    }

    fn name(&self) -> &'static str {
        "autoencoder"
    }
}
