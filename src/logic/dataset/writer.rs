use std::fs;
use std::path::Path;

use tempfile::NamedTempFile;

use super::record::Dataset;
use crate::constants::{ERROR_COLUMN, PREDICTION_COLUMN};
use crate::error::{PipelineError, Result};

/// Write `dataset` plus the error and prediction columns to `path`
///
/// Rows go to a temp file in the destination directory which is renamed
/// into place once complete, so a failure never leaves a partial file.
pub fn write_scored_csv(
    dataset: &Dataset,
    errors: &[f64],
    labels: &[u8],
    path: &Path,
) -> Result<usize> {
    if errors.len() != dataset.len() || labels.len() != dataset.len() {
        return Err(PipelineError::output(
            path,
            format!(
                "row count mismatch: {} rows, {} errors, {} labels",
                dataset.len(),
                errors.len(),
                labels.len()
            ),
        ));
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    fs::create_dir_all(&dir).map_err(|e| PipelineError::output(path, e))?;

    let tmp = NamedTempFile::new_in(&dir).map_err(|e| PipelineError::output(path, e))?;

    {
        let mut wtr = csv::Writer::from_writer(tmp.as_file());

        let mut header: Vec<&str> = dataset.headers.iter().map(String::as_str).collect();
        header.push(ERROR_COLUMN);
        header.push(PREDICTION_COLUMN);
        wtr.write_record(&header).map_err(|e| PipelineError::output(path, e))?;

        for ((row, error), label) in dataset.rows.iter().zip(errors).zip(labels) {
            let mut record: Vec<String> = row.clone();
            record.push(error.to_string());
            record.push(label.to_string());
            wtr.write_record(&record).map_err(|e| PipelineError::output(path, e))?;
        }

        wtr.flush().map_err(|e| PipelineError::output(path, e))?;
    }

    tmp.as_file().sync_all().map_err(|e| PipelineError::output(path, e))?;
    tmp.persist(path).map_err(|e| PipelineError::output(path, e.error))?;

    log::info!("Wrote {} scored rows to {}", dataset.len(), path.display());
    Ok(dataset.len())
}
