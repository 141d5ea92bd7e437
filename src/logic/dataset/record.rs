use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ndarray::Array2;

use super::is_missing;
use crate::error::{PipelineError, Result};

/// In-memory table, row-major, cells kept as read
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub source: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// What forward fill did to a table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillReport {
    /// Cells filled from an earlier row
    pub filled: usize,
    /// (column, first unresolved row) for leading gaps
    pub unresolved: Vec<(String, usize)>,
}

impl Dataset {
    pub fn new(source: impl Into<PathBuf>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let source = source.into();

        let mut seen = HashSet::new();
        for name in &headers {
            if name.is_empty() {
                return Err(PipelineError::data_load(&source, "empty column name in header"));
            }
            if !seen.insert(name.as_str()) {
                return Err(PipelineError::data_load(&source, format!("duplicate column '{}'", name)));
            }
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(PipelineError::data_load(
                    &source,
                    format!("row {} has {} cells, header has {}", i, row.len(), headers.len()),
                ));
            }
        }

        Ok(Self { source, headers, rows })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// All columns except `label_column`, in file order
    pub fn feature_columns(&self, label_column: &str) -> Vec<String> {
        self.headers
            .iter()
            .filter(|h| h.as_str() != label_column)
            .cloned()
            .collect()
    }

    /// Column cells, `None` where missing
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| {
                    let cell = row[idx].as_str();
                    if is_missing(cell) { None } else { Some(cell) }
                })
                .collect(),
        )
    }

    /// Forward-fill missing cells along row order, column by column
    pub fn forward_fill(&mut self) -> FillReport {
        let mut report = FillReport::default();

        for (col, name) in self.headers.iter().enumerate() {
            let mut last: Option<String> = None;
            let mut first_gap: Option<usize> = None;

            for (row_idx, row) in self.rows.iter_mut().enumerate() {
                if is_missing(&row[col]) {
                    match &last {
                        Some(value) => {
                            row[col] = value.clone();
                            report.filled += 1;
                        }
                        None => {
                            first_gap.get_or_insert(row_idx);
                        }
                    }
                } else {
                    last = Some(row[col].clone());
                }
            }

            if let Some(row) = first_gap {
                report.unresolved.push((name.clone(), row));
            }
        }

        report
    }

    /// Numeric matrix of `columns`, in the given order
    ///
    /// A missing cell fails with `MissingValue`, a non-numeric one with
    /// `DataLoad`. No value is ever substituted.
    pub fn feature_matrix(&self, columns: &[String]) -> Result<Array2<f64>> {
        let indices = columns
            .iter()
            .map(|name| {
                self.column_index(name).ok_or_else(|| {
                    PipelineError::data_load(&self.source, format!("missing feature column '{}'", name))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut matrix = Array2::<f64>::zeros((self.rows.len(), indices.len()));

        for (r, row) in self.rows.iter().enumerate() {
            for (c, &idx) in indices.iter().enumerate() {
                let cell = row[idx].trim();
                if is_missing(cell) {
                    return Err(PipelineError::MissingValue { column: columns[c].clone(), row: r });
                }
                let value: f64 = cell.parse().map_err(|_| {
                    PipelineError::data_load(
                        &self.source,
                        format!("non-numeric value '{}' in column '{}' at row {}", cell, columns[c], r),
                    )
                })?;
                if !value.is_finite() {
                    return Err(PipelineError::data_load(
                        &self.source,
                        format!("non-finite value '{}' in column '{}' at row {}", cell, columns[c], r),
                    ));
                }
                matrix[[r, c]] = value;
            }
        }

        Ok(matrix)
    }
}
