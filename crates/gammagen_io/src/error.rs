//! Error types for gammagen_io crate.
//!
//! Distinguishes a dataset that cannot be opened or parsed at all from one
//! whose records lack the expected fields.

use thiserror::Error;

/// Main error type for gammagen_io operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// Missing, unreadable, or malformed dataset file
    #[error("Cannot open dataset {path}: {reason}")]
    DatasetOpen { path: String, reason: String },

    /// Dataset parsed, but a record lacks the expected fields
    #[error("Dataset schema error in {path} at line {line}: {reason}")]
    DatasetSchema {
        path: String,
        line: usize,
        reason: String,
    },

    /// Unreadable or inconsistent level-scheme file
    #[error("Level data error in {path}: {reason}")]
    LevelData { path: String, reason: String },

    /// File system errors
    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    /// JSON encoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<IoError>,
    },
}

/// Result type alias for gammagen_io operations.
pub type Result<T> = std::result::Result<T, IoError>;

impl IoError {
    #[must_use]
    pub fn dataset_open<P: Into<String>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::DatasetOpen {
            path: path.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn dataset_schema<P: Into<String>, S: Into<String>>(
        path: P,
        line: usize,
        reason: S,
    ) -> Self {
        Self::DatasetSchema {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn level_data<P: Into<String>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::LevelData {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Wraps an error with additional context.
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Strips any context wrappers.
    #[must_use]
    pub fn root(&self) -> &IoError {
        match self {
            IoError::Context { source, .. } => source.root(),
            other => other,
        }
    }
}
