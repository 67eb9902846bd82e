//! Sequential, filtered, wrap-around iteration over a cascade dataset.
//!
//! The reader walks records in index order, skipping empty records and
//! records rejected by the [`FilterPolicy`]. At the end of the dataset it
//! wraps to the first record exactly once per call; if a full pass after the
//! wrap still finds nothing acceptable the call fails with
//! [`GeneratorError::ExhaustedDataset`] instead of looping forever.

use crate::config::Verbosity;
use crate::error::GeneratorError;
use gammagen_data::{Cascade, CascadeRecord, FilterPolicy};
use gammagen_io::CascadeDataset;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Random access to dataset records by index.
pub trait RecordSource: Send + Sync {
    fn total_records(&self) -> u64;
    fn record(&self, index: u64) -> Option<&CascadeRecord>;

    /// Label used in log lines.
    fn describe(&self) -> String {
        "<records>".to_string()
    }
}

impl RecordSource for CascadeDataset {
    fn total_records(&self) -> u64 {
        self.len()
    }

    fn record(&self, index: u64) -> Option<&CascadeRecord> {
        self.get(index)
    }

    fn describe(&self) -> String {
        self.path().display().to_string()
    }
}

impl RecordSource for Vec<CascadeRecord> {
    fn total_records(&self) -> u64 {
        self.len() as u64
    }

    fn record(&self, index: u64) -> Option<&CascadeRecord> {
        usize::try_from(index).ok().and_then(|i| self.get(i))
    }
}

/// Position and bookkeeping of a reader.
///
/// `0 <= current_index <= total_records` always holds. `skipped_count`
/// counts every rejected record, empty ones included; `empty_count` is the
/// empty subset of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderCursor {
    pub current_index: u64,
    pub total_records: u64,
    pub skipped_count: u64,
    pub empty_count: u64,
    pub wraps: u64,
}

pub struct CascadeFileReader {
    source: Box<dyn RecordSource>,
    cursor: ReaderCursor,
    filter: FilterPolicy,
    verbosity: Verbosity,
}

impl std::fmt::Debug for CascadeFileReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeFileReader")
            .field("source", &self.source.describe())
            .field("cursor", &self.cursor)
            .field("filter", &self.filter)
            .finish()
    }
}

impl CascadeFileReader {
    pub fn new<S: RecordSource + 'static>(source: S, filter: FilterPolicy) -> Self {
        let total_records = source.total_records();
        Self {
            source: Box::new(source),
            cursor: ReaderCursor {
                total_records,
                ..ReaderCursor::default()
            },
            filter,
            verbosity: Verbosity::default(),
        }
    }

    /// Loads the dataset at `path` and positions the cursor at its first record.
    pub fn open<P: AsRef<Path>>(
        path: P,
        filter: FilterPolicy,
        verbosity: Verbosity,
    ) -> Result<Self, GeneratorError> {
        let dataset = CascadeDataset::open(path)?;
        if !verbosity.is_quiet() {
            tracing::info!(
                file = %dataset.path().display(),
                records = dataset.len(),
                fingerprint = %dataset.fingerprint(),
                two_gamma_only = filter.enabled,
                "Cascade dataset initialized"
            );
        }
        if dataset.is_empty() {
            tracing::warn!(file = %dataset.path().display(), "Cascade dataset has no records");
        }
        Ok(Self::new(dataset, filter).with_verbosity(verbosity))
    }

    #[must_use]
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub fn cursor(&self) -> ReaderCursor {
        self.cursor
    }

    #[must_use]
    pub fn filter(&self) -> FilterPolicy {
        self.filter
    }

    pub fn set_filter(&mut self, filter: FilterPolicy) {
        self.filter = filter;
    }

    #[must_use]
    pub fn source_label(&self) -> String {
        self.source.describe()
    }

    /// Returns the next non-empty cascade that satisfies the filter.
    pub fn next_cascade(&mut self) -> Result<Cascade, GeneratorError> {
        if let Some(cascade) = self.scan_to_end() {
            return Ok(cascade);
        }

        self.cursor.current_index = 0;
        self.cursor.wraps += 1;
        let found = self.scan_to_end();
        self.log_wrap(found.is_some());

        found.ok_or(GeneratorError::ExhaustedDataset {
            total_records: self.cursor.total_records,
            skipped: self.cursor.skipped_count,
        })
    }

    /// Only a wrap that yields a cascade is worth an info line; a failing
    /// one is reported by the caller's rate-limited error log.
    fn announces_wrap(&self, found: bool) -> bool {
        found && !self.verbosity.is_quiet()
    }

    fn log_wrap(&self, found: bool) {
        if self.announces_wrap(found) {
            tracing::info!(
                source = %self.source.describe(),
                wraps = self.cursor.wraps,
                skipped = self.cursor.skipped_count,
                "Reached end of cascade dataset, wrapping to beginning"
            );
        } else {
            tracing::debug!(
                source = %self.source.describe(),
                wraps = self.cursor.wraps,
                found,
                "Wrapped cascade dataset"
            );
        }
    }

    fn scan_to_end(&mut self) -> Option<Cascade> {
        while self.cursor.current_index < self.cursor.total_records {
            let index = self.cursor.current_index;
            self.cursor.current_index += 1;

            match self.source.record(index) {
                Some(record) if !record.is_empty() => {
                    if self.filter.accepts(&record.gamma_energies) {
                        return Some(Cascade::from_record(index, record));
                    }
                    self.cursor.skipped_count += 1;
                }
                _ => {
                    self.cursor.skipped_count += 1;
                    self.cursor.empty_count += 1;
                }
            }
        }
        None
    }
}
