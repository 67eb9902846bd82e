//! # Gammagen Core
//!
//! The primary event generation engine of the HPGe detector simulation.
//!
//! Each call to [`PrimaryGenerator::generate_event`] materializes the gamma
//! rays of one event according to the active [`GenerationMode`]:
//! - **FixedPair**: both Co-60 lines with independent isotropic directions
//! - **SingleLine**: one randomly chosen Co-60 line
//! - **ExternalCascade**: a capture cascade from a [`DeexcitationModel`]
//! - **FileCascade**: pre-computed cascades read from a dataset with
//!   filtering and wrap-around
//!
//! Every generator owns its own `ChaCha8Rng` and reader cursor, so parallel
//! workers never share mutable state. With a fixed seed the event sequence
//! of one instance is reproducible.
//!
//! ## Example
//!
//! ```
//! use gammagen_core::{GeneratorConfig, LevelSchemeModel, PrimaryGenerator};
//!
//! let mut config = GeneratorConfig::default();
//! config.seed = Some(42);
//!
//! let model = LevelSchemeModel::new(None);
//! let mut generator = PrimaryGenerator::new(&config, Box::new(model));
//! let gammas = generator.generate_event().unwrap();
//! assert_eq!(gammas.len(), 2);
//! ```

/// External de-excitation model boundary and the cascade adapter
pub mod cascade;
/// Strongly-typed generator configuration backed by TOML
pub mod config;
/// Error types for generation failures
pub mod error;
/// The generation mode dispatcher
pub mod generator;
/// Reference level-scheme de-excitation model
pub mod levels;
/// Tracing subscriber setup
pub mod logging;
/// Sequential, filtered, wrap-around dataset reader
pub mod reader;
/// Angular, positional and fixed-line sampling
pub mod sampler;
/// Emission sink boundary
pub mod sink;

pub use cascade::{CascadeAdapter, DeexcitationModel};
pub use config::{GeneratorConfig, Verbosity};
pub use error::GeneratorError;
pub use gammagen_data::{
    Cascade, CascadeRecord, FilterPolicy, GammaEmission, GenerationMode, IsotopeKey, Vec3,
};
pub use generator::{GeneratorStats, ModeCounts, PrimaryGenerator};
pub use levels::LevelSchemeModel;
pub use logging::init_logging;
pub use reader::{CascadeFileReader, ReaderCursor, RecordSource};
pub use sink::EmissionSink;
