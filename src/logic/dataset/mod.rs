//! Dataset Module - Tabular input/output
//!
//! Loads labeled CSV tables, applies the forward-fill imputation policy and
//! writes scored tables back out.
//!
//! # Architecture
//! - `record.rs`: `Dataset` (raw string cells + header)
//! - `loader.rs`: CSV ingestion
//! - `writer.rs`: scored CSV output (temp file + rename)
//!
//! # Imputation policy
//! Missing cells take the last valid value above them in the same column.
//! A gap with no earlier value stays missing and fails feature extraction
//! with `MissingValue`; it is never replaced by zero.

pub mod record;
pub mod loader;
pub mod writer;

#[cfg(test)]
mod tests;

pub use record::{Dataset, FillReport};
pub use loader::load_csv;
pub use writer::write_scored_csv;

/// Cell spellings treated as missing
pub const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "NaN", "nan", "NAN", "null", "NULL", "None", "-nan",
];

pub fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell.trim())
}
