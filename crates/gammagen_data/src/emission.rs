use crate::vector::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Particle type discriminator for model products and sink emissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleKind {
    Gamma,
    Electron,
    Other(String),
}

impl fmt::Display for ParticleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticleKind::Gamma => write!(f, "gamma"),
            ParticleKind::Electron => write!(f, "e-"),
            ParticleKind::Other(name) => write!(f, "{name}"),
        }
    }
}

/// One primary gamma handed to the emission sink.
///
/// Fields are private: an emission is built once and only read afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GammaEmission {
    energy_mev: f64,
    direction: Vec3,
    position: Vec3,
    time_ns: f64,
}

impl GammaEmission {
    /// Creates an emission. `direction` is expected to be a unit vector.
    #[must_use]
    pub fn new(energy_mev: f64, direction: Vec3, position: Vec3, time_ns: f64) -> Self {
        debug_assert!(energy_mev > 0.0, "gamma energy must be positive");
        debug_assert!(time_ns >= 0.0, "emission time must be non-negative");
        Self {
            energy_mev,
            direction,
            position,
            time_ns,
        }
    }

    /// Prompt emission (t = 0), the only timing the generators produce.
    #[must_use]
    pub fn prompt(energy_mev: f64, direction: Vec3, position: Vec3) -> Self {
        Self::new(energy_mev, direction, position, 0.0)
    }

    #[must_use]
    pub fn energy_mev(&self) -> f64 {
        self.energy_mev
    }

    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub fn time_ns(&self) -> f64 {
        self.time_ns
    }
}

/// A product returned by an external de-excitation model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmittedParticle {
    pub kind: ParticleKind,
    /// Momentum in MeV/c; for photons its magnitude is the energy.
    pub momentum: Vec3,
    pub time_ns: f64,
}

impl EmittedParticle {
    #[must_use]
    pub fn gamma(momentum: Vec3) -> Self {
        Self {
            kind: ParticleKind::Gamma,
            momentum,
            time_ns: 0.0,
        }
    }

    #[must_use]
    pub fn electron(momentum: Vec3) -> Self {
        Self {
            kind: ParticleKind::Electron,
            momentum,
            time_ns: 0.0,
        }
    }

    #[must_use]
    pub fn is_gamma(&self) -> bool {
        self.kind == ParticleKind::Gamma
    }

    /// Momentum magnitude.
    #[must_use]
    pub fn momentum_mag(&self) -> f64 {
        self.momentum.norm()
    }
}
