//! Label encoder: distinct label values → 0..n codes
//!
//! Classes are sorted numerically when every label parses as a number,
//! lexicographically otherwise. Refit from scratch on every training run.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, labels: &[&str]) -> Result<()> {
        if labels.is_empty() {
            return Err(PipelineError::Model("cannot fit label encoder on no labels".to_string()));
        }

        let mut classes: Vec<String> = labels.iter().map(|l| l.to_string()).collect();

        let numeric: Option<Vec<f64>> = classes.iter().map(|c| c.parse::<f64>().ok()).collect();
        if numeric.is_some() {
            classes.sort_by(|a, b| {
                let (x, y) = (a.parse::<f64>().unwrap_or(0.0), b.parse::<f64>().unwrap_or(0.0));
                x.partial_cmp(&y).unwrap_or(Ordering::Equal).then_with(|| a.cmp(b))
            });
        } else {
            classes.sort();
        }
        classes.dedup();

        self.classes = classes;
        Ok(())
    }

    pub fn transform(&self, labels: &[&str]) -> Result<Vec<usize>> {
        labels
            .iter()
            .map(|label| {
                self.code(label).ok_or_else(|| {
                    PipelineError::Model(format!("unseen label '{}' (known: {:?})", label, self.classes))
                })
            })
            .collect()
    }

    pub fn fit_transform(&mut self, labels: &[&str]) -> Result<Vec<usize>> {
        self.fit(labels)?;
        self.transform(labels)
    }

    pub fn code(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }

    pub fn inverse(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}
