//! # Gammagen Data
//!
//! Plain data types shared by the generator engine, the dataset loaders and
//! the batch driver. Nothing in here draws random numbers or touches files.

/// Physical constants and the fixed source lines
pub mod constants;
/// Cascades, dataset records and the acceptance filter
pub mod cascade;
/// Emitted gammas and external model products
pub mod emission;
/// Nuclide identification and ground-state masses
pub mod isotope;
/// Generation modes of the dispatcher
pub mod mode;
/// Minimal 3-vector used for directions, positions and momenta
pub mod vector;

pub use cascade::{Cascade, CascadeRecord, FilterPolicy};
pub use emission::{EmittedParticle, GammaEmission, ParticleKind};
pub use isotope::{ExcitedNucleus, IsotopeKey};
pub use mode::{GenerationMode, ParseModeError};
pub use vector::Vec3;
