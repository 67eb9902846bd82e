use crate::constants::{
    CL36_SEPARATION_ENERGY_MEV, NEUTRON_MASS_MEV, PROTON_MASS_MEV, SEMF_ASYMMETRY,
    SEMF_COULOMB, SEMF_PAIRING, SEMF_SURFACE, SEMF_VOLUME,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a nuclide by proton count `z` and mass number `a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IsotopeKey {
    pub z: u32,
    pub a: u32,
}

impl IsotopeKey {
    /// Cl-36, the compound nucleus of thermal capture on Cl-35.
    pub const CL36: IsotopeKey = IsotopeKey { z: 17, a: 36 };

    pub const fn new(z: u32, a: u32) -> Self {
        Self { z, a }
    }

    /// Neutron count.
    #[must_use]
    pub fn n(&self) -> u32 {
        self.a.saturating_sub(self.z)
    }

    /// Ground-state mass from the semi-empirical mass formula (MeV/c²).
    #[must_use]
    pub fn ground_state_mass_mev(&self) -> f64 {
        let z = self.z as f64;
        let a = self.a as f64;
        let n = self.n() as f64;
        if self.a == 0 {
            return 0.0;
        }
        if self.a == 1 {
            return if self.z == 1 {
                PROTON_MASS_MEV
            } else {
                NEUTRON_MASS_MEV
            };
        }

        let pairing = match (self.z % 2, self.n() % 2) {
            (0, 0) => SEMF_PAIRING / a.sqrt(),
            (1, 1) => -SEMF_PAIRING / a.sqrt(),
            _ => 0.0,
        };
        let binding = SEMF_VOLUME * a
            - SEMF_SURFACE * a.powf(2.0 / 3.0)
            - SEMF_COULOMB * z * (z - 1.0) / a.cbrt()
            - SEMF_ASYMMETRY * (a - 2.0 * z).powi(2) / a
            + pairing;

        z * PROTON_MASS_MEV + n * NEUTRON_MASS_MEV - binding.max(0.0)
    }
}

impl Default for IsotopeKey {
    fn default() -> Self {
        Self::CL36
    }
}

impl fmt::Display for IsotopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Z={} A={}", self.z, self.a)
    }
}

/// A nucleus at rest carrying `excitation_mev` above its ground state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExcitedNucleus {
    pub isotope: IsotopeKey,
    pub ground_state_mass_mev: f64,
    pub excitation_mev: f64,
}

impl ExcitedNucleus {
    #[must_use]
    pub fn at_rest(isotope: IsotopeKey, excitation_mev: f64) -> Self {
        Self {
            isotope,
            ground_state_mass_mev: isotope.ground_state_mass_mev(),
            excitation_mev,
        }
    }

    /// Total energy of the nucleus at rest: rest mass plus excitation.
    #[must_use]
    pub fn total_energy_mev(&self) -> f64 {
        self.ground_state_mass_mev + self.excitation_mev
    }
}

/// Default capture setup: Cl-36 at its neutron separation energy.
#[must_use]
pub fn default_capture() -> (IsotopeKey, f64) {
    (IsotopeKey::CL36, CL36_SEPARATION_ENERGY_MEV)
}
