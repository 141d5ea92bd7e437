//! Training mode

use ndarray::{ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::TrainingSummary;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::logic::bundle::{save_bundle, ArtifactBundle};
use crate::logic::dataset::{load_csv, Dataset};
use crate::logic::features::FeatureLayout;
use crate::logic::model::{ReconstructionModel, Reconstructor, TrainingHistory};
use crate::logic::preprocess::{LabelEncoder, Normalizer, StandardScaler};
use crate::logic::scoring::{fit_threshold, ThresholdPolicy, ThresholdStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSizes {
    pub fit: usize,
    pub validation: usize,
}

/// Shuffle `0..n` with `seed` and cut off `ceil(n * ratio)` validation rows
///
/// Returns `(fit, validation)` row indices. Needs at least one fit row and
/// two validation rows (the threshold uses a sample standard deviation).
pub fn split_indices(n: usize, ratio: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(ratio > 0.0 && ratio < 1.0) {
        return Err(PipelineError::invalid_config("split_ratio", format!("must be in (0, 1), got {}", ratio)));
    }

    let n_val = (n as f64 * ratio).ceil() as usize;
    if n_val < 2 || n_val >= n {
        return Err(PipelineError::DegenerateSplit(format!(
            "{} rows at ratio {} give {} validation and {} fit rows (need >= 2 and >= 1)",
            n,
            ratio,
            n_val,
            n.saturating_sub(n_val)
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let fit = indices.split_off(n_val);
    Ok((fit, indices))
}

/// Fit `model` on `fit_rows`, then derive the threshold on `validation_rows`
///
/// Validation rows are only passed to the model for loss reporting.
pub fn fit_model<M>(
    model: &mut M,
    fit_rows: ArrayView2<f64>,
    validation_rows: ArrayView2<f64>,
    policy: &ThresholdPolicy,
) -> Result<(TrainingHistory, ThresholdStats)>
where
    M: ReconstructionModel + ?Sized,
{
    log::info!(
        "Fitting {} on {} rows ({} held out)",
        model.name(),
        fit_rows.nrows(),
        validation_rows.nrows()
    );
    let history = model.fit(fit_rows, Some(validation_rows))?;

    let stats = fit_threshold(&*model, validation_rows, policy)?;
    log::info!(
        "Threshold {:.6} (mean {:.6}, std {:.6}, max {:.6}, n={})",
        stats.threshold,
        stats.mean,
        stats.std_dev,
        stats.max,
        stats.count
    );

    Ok((history, stats))
}

fn encode_labels(dataset: &Dataset, label_column: &str) -> Result<LabelEncoder> {
    let cells = dataset.column(label_column).ok_or_else(|| {
        PipelineError::data_load(dataset.source(), format!("no label column '{}'", label_column))
    })?;

    let labels = cells
        .into_iter()
        .enumerate()
        .map(|(row, cell)| {
            cell.ok_or_else(|| PipelineError::MissingValue { column: label_column.to_string(), row })
        })
        .collect::<Result<Vec<&str>>>()?;

    let mut encoder = LabelEncoder::new();
    encoder.fit(&labels)?;
    Ok(encoder)
}

/// Train a model on `config.data_path` and publish the bundle
pub fn train(config: &PipelineConfig) -> Result<TrainingSummary> {
    config.validate()?;
    let policy = ThresholdPolicy::new(config.threshold_multiplier)?;

    log::info!("Training from {}", config.data_path.display());
    let mut dataset = load_csv(&config.data_path)?;
    let layout = FeatureLayout::from_training(&dataset, &config.label_column)?;

    let report = dataset.forward_fill();
    if report.filled > 0 {
        log::info!("Forward-filled {} missing cells", report.filled);
    }
    for (column, row) in &report.unresolved {
        log::warn!("Column '{}' has no value before row {}", column, row);
    }

    let label_encoder = encode_labels(&dataset, &config.label_column)?;
    log::info!("Label classes: {:?}", label_encoder.classes);

    let features = dataset.feature_matrix(&layout.feature_names)?;
    let mut normalizer = StandardScaler::new();
    let normalized = normalizer.fit_transform(features.view())?;

    let (fit_idx, val_idx) = split_indices(normalized.nrows(), config.split_ratio, config.split_seed)?;
    let fit_rows = normalized.select(Axis(0), &fit_idx);
    let validation_rows = normalized.select(Axis(0), &val_idx);

    let mut model = Reconstructor::from_config(&config.training);
    let (history, stats) = fit_model(&mut model, fit_rows.view(), validation_rows.view(), &policy)?;

    let bundle = ArtifactBundle::new(layout, normalizer, label_encoder, model, stats);
    save_bundle(&bundle, &config.artifact_dir)?;

    Ok(TrainingSummary {
        bundle_id: bundle.id().to_string(),
        artifact_dir: config.artifact_dir.clone(),
        model_kind: bundle.model.kind(),
        rows: dataset.len(),
        features: bundle.layout().dim(),
        split: SplitSizes { fit: fit_idx.len(), validation: val_idx.len() },
        label_classes: bundle.label_encoder.classes.clone(),
        threshold: bundle.manifest.validation.clone(),
        epochs_run: history.epochs_run,
        stopped_early: history.stopped_early,
        final_train_loss: history.final_train_loss(),
        final_val_loss: history.final_val_loss(),
    })
}
