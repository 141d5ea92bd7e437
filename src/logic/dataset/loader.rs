use std::path::Path;

use super::record::Dataset;
use crate::error::{PipelineError, Result};

/// Load a CSV table with a header row
///
/// Fails with `DataLoad` when the file is unreadable, ragged, or has no
/// data rows.
pub fn load_csv(path: &Path) -> Result<Dataset> {
    log::info!("Loading dataset from: {}", path.display());

    if !path.exists() {
        return Err(PipelineError::data_load(path, "file not found"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| PipelineError::data_load(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| PipelineError::data_load(path, format!("unreadable header: {}", e)))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        return Err(PipelineError::data_load(path, "no header row"));
    }

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| PipelineError::data_load(path, format!("row {}: {}", i, e)))?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    if rows.is_empty() {
        return Err(PipelineError::data_load(path, "no data rows"));
    }

    let dataset = Dataset::new(path, headers, rows)?;
    log::info!("Loaded {} rows x {} columns", dataset.len(), dataset.headers.len());
    Ok(dataset)
}
