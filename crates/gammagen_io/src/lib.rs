//! # Gammagen IO
//!
//! File formats consumed by the generator:
//! - Cascade datasets: JSON Lines records with `Egs`/`Exfs` lists, optionally gzip-compressed
//! - Level schemes: CapGam-derived binary level files named `{Z}-{A}.bin`

/// Cascade dataset loading and writing
pub mod dataset;
/// Error types and result aliases for file operations
pub mod error;
/// Binary level-scheme files for the reference de-excitation model
pub mod levels;

pub use dataset::CascadeDataset;
pub use error::{IoError, Result};
pub use levels::{Level, LevelScheme, Transition, TransitionKind};
