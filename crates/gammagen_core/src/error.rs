//! Error types for the generation engine.
//!
//! Errors are returned per event; the run loop decides whether to skip or
//! abort. Sampling itself cannot fail.

use gammagen_io::IoError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    /// Dataset file missing, unreadable or malformed
    #[error("Cannot open cascade dataset {path}: {reason}")]
    DatasetOpen { path: String, reason: String },

    /// Dataset records lack the expected fields
    #[error("Cascade dataset {path} has an unexpected schema at line {line}: {reason}")]
    DatasetSchema {
        path: String,
        line: usize,
        reason: String,
    },

    /// File-cascade mode requested without an open dataset
    #[error("No cascade dataset is open")]
    DatasetUnavailable,

    /// No record satisfies the filter, even after one full wrap
    #[error("No acceptable cascade among {total_records} records after a full wrap ({skipped} skipped so far)")]
    ExhaustedDataset { total_records: u64, skipped: u64 },

    /// The de-excitation model has no data for the isotope
    #[error("No de-excitation data for isotope Z={z} A={a}")]
    NoIsotopeData { z: u32, a: u32 },

    /// Inconsistent level data inside the de-excitation model
    #[error("Level scheme error: {0}")]
    LevelScheme(String),
}

impl GeneratorError {
    /// Whether the error disables file-cascade mode for this instance.
    #[must_use]
    pub fn is_dataset_fatal(&self) -> bool {
        matches!(
            self,
            GeneratorError::DatasetOpen { .. }
                | GeneratorError::DatasetSchema { .. }
                | GeneratorError::DatasetUnavailable
        )
    }
}

impl From<IoError> for GeneratorError {
    fn from(err: IoError) -> Self {
        match err.root() {
            IoError::DatasetOpen { path, reason } => GeneratorError::DatasetOpen {
                path: path.clone(),
                reason: reason.clone(),
            },
            IoError::DatasetSchema { path, line, reason } => GeneratorError::DatasetSchema {
                path: path.clone(),
                line: *line,
                reason: reason.clone(),
            },
            IoError::LevelData { path, reason } => {
                GeneratorError::LevelScheme(format!("{path}: {reason}"))
            }
            other => GeneratorError::DatasetOpen {
                path: String::new(),
                reason: other.to_string(),
            },
        }
    }
}
