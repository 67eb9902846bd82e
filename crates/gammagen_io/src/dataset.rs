//! Cascade dataset files.
//!
//! A dataset is a JSON Lines file: one record object per line, each with a
//! required `Egs` list of gamma energies (MeV) and an optional `Exfs` list.
//! Files whose name ends in `.gz` are gunzipped transparently. The whole
//! dataset is loaded into an immutable, cheaply clonable snapshot so several
//! generator instances can iterate it independently.

use crate::error::{IoError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use gammagen_data::CascadeRecord;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const GAMMA_FIELD: &str = "Egs";

#[derive(Debug, Clone)]
pub struct CascadeDataset {
    path: PathBuf,
    records: Arc<[CascadeRecord]>,
    fingerprint: String,
}

impl CascadeDataset {
    /// Loads every record of the dataset at `path`.
    ///
    /// Fails with `IoError::DatasetOpen` when the file is missing, cannot be
    /// decompressed or contains malformed JSON, and with
    /// `IoError::DatasetSchema` when a record lacks a numeric `Egs` list.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let label = path.display().to_string();

        let mut raw = Vec::new();
        File::open(path)
            .and_then(|mut f| f.read_to_end(&mut raw))
            .map_err(|e| IoError::dataset_open(&label, e.to_string()))?;

        let fingerprint = hex::encode(Sha256::digest(&raw));
        let text = if is_gzip_path(path) {
            let mut decoded = String::new();
            GzDecoder::new(raw.as_slice())
                .read_to_string(&mut decoded)
                .map_err(|e| IoError::dataset_open(&label, format!("gzip decode failed: {e}")))?;
            decoded
        } else {
            String::from_utf8(raw)
                .map_err(|e| IoError::dataset_open(&label, format!("invalid UTF-8: {e}")))?
        };

        let records = parse_records(&label, &text)?;

        tracing::debug!(
            path = %label,
            records = records.len(),
            fingerprint = %fingerprint,
            "Cascade dataset loaded"
        );

        Ok(Self {
            path: path.to_path_buf(),
            records: records.into(),
            fingerprint,
        })
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        self.records.len() as u64
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: u64) -> Option<&CascadeRecord> {
        usize::try_from(index).ok().and_then(|i| self.records.get(i))
    }

    #[must_use]
    pub fn records(&self) -> &[CascadeRecord] {
        &self.records
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// SHA-256 of the file bytes as stored on disk, hex encoded.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Writes `records` as JSON Lines, gzip-compressed when `path` ends in `.gz`.
    pub fn write_json_lines<P: AsRef<Path>>(records: &[CascadeRecord], path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        if is_gzip_path(path) {
            let mut encoder = GzEncoder::new(file, Compression::default());
            write_lines(&mut encoder, records)?;
            encoder.finish()?;
        } else {
            let mut writer = BufWriter::new(file);
            write_lines(&mut writer, records)?;
            writer.flush()?;
        }
        Ok(())
    }
}

fn write_lines<W: Write>(writer: &mut W, records: &[CascadeRecord]) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

fn is_gzip_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

fn parse_records(label: &str, text: &str) -> Result<Vec<CascadeRecord>> {
    let mut records = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(line).map_err(|e| {
            IoError::dataset_open(label, format!("malformed record at line {line_no}: {e}"))
        })?;

        let Value::Object(map) = &value else {
            return Err(IoError::dataset_schema(
                label,
                line_no,
                "record is not a JSON object",
            ));
        };
        if !map.contains_key(GAMMA_FIELD) {
            return Err(IoError::dataset_schema(
                label,
                line_no,
                format!("missing field `{GAMMA_FIELD}`"),
            ));
        }

        let record: CascadeRecord = serde_json::from_value(value)
            .map_err(|e| IoError::dataset_schema(label, line_no, e.to_string()))?;
        if let Some(bad) = record
            .gamma_energies
            .iter()
            .find(|e| !(e.is_finite() && **e > 0.0))
        {
            return Err(IoError::dataset_schema(
                label,
                line_no,
                format!("gamma energy {bad} is not positive"),
            ));
        }
        records.push(record);
    }
    Ok(records)
}
