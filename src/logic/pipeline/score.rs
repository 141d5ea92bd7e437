//! Scoring mode

use super::ScoringSummary;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::logic::bundle::load_bundle;
use crate::logic::dataset::{load_csv, write_scored_csv};
use crate::logic::scoring::detect;

/// Score `config.data_path` against the bundle in `config.artifact_dir`
///
/// The label column (the trained name or `config.label_column`) is optional
/// and carried through untouched. Every check runs before the output file
/// is created.
pub fn score(config: &PipelineConfig) -> Result<ScoringSummary> {
    let bundle = load_bundle(&config.artifact_dir)?;

    log::info!("Scoring {}", config.data_path.display());
    let mut dataset = load_csv(&config.data_path)?;

    let report = dataset.forward_fill();
    if report.filled > 0 {
        log::info!("Forward-filled {} missing cells", report.filled);
    }

    let columns = bundle.layout().validate_dataset(&dataset, &config.label_column)?;
    let features = dataset.feature_matrix(columns)?;

    let detections = detect(&bundle.normalizer, &bundle.model, bundle.threshold, features.view())?;
    let rows = write_scored_csv(&dataset, &detections.errors, &detections.labels, &config.output_path)?;

    log::info!(
        "Scored {} rows: {} anomalies ({:.2}%) above {:.6}",
        rows,
        detections.anomaly_count(),
        detections.anomaly_rate() * 100.0,
        detections.threshold
    );

    Ok(ScoringSummary {
        bundle_id: bundle.id().to_string(),
        rows,
        anomalies: detections.anomaly_count(),
        anomaly_rate: detections.anomaly_rate(),
        threshold: detections.threshold,
        output_path: config.output_path.clone(),
    })
}
