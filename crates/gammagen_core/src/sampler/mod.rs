//! Samplers used by every generation mode.
//!
//! All sampling functions take the caller's random source, so a generator
//! instance and everything it samples share one reproducible stream.

mod angular;
mod lines;

pub use angular::{isotropic_direction, SourcePosition};
pub use lines::FixedLineSampler;
