use crate::constants::{DEFAULT_MIN_TOTAL_ENERGY_MEV, DEFAULT_REQUIRED_MULTIPLICITY};
use serde::{Deserialize, Serialize};

/// One record of a cascade dataset.
///
/// Field names follow the RAINIER output branches: `Egs` holds the gamma
/// energies in MeV and `Exfs` the residual excitations, carried through
/// untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CascadeRecord {
    #[serde(rename = "Egs")]
    pub gamma_energies: Vec<f64>,
    #[serde(rename = "Exfs", default, skip_serializing_if = "Vec::is_empty")]
    pub final_excitations: Vec<f64>,
}

impl CascadeRecord {
    #[must_use]
    pub fn new(gamma_energies: Vec<f64>) -> Self {
        Self {
            gamma_energies,
            final_excitations: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gamma_energies.is_empty()
    }
}

/// An accepted cascade: the gamma energies of one de-excitation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cascade {
    /// Index of the dataset record this cascade was read from.
    pub record_index: u64,
    energies: Vec<f64>,
    final_excitations: Vec<f64>,
}

impl Cascade {
    #[must_use]
    pub fn from_record(record_index: u64, record: &CascadeRecord) -> Self {
        Self {
            record_index,
            energies: record.gamma_energies.clone(),
            final_excitations: record.final_excitations.clone(),
        }
    }

    #[must_use]
    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    #[must_use]
    pub fn final_excitations(&self) -> &[f64] {
        &self.final_excitations
    }

    #[must_use]
    pub fn multiplicity(&self) -> usize {
        self.energies.len()
    }

    #[must_use]
    pub fn total_energy(&self) -> f64 {
        self.energies.iter().sum()
    }
}

/// Acceptance filter for dataset cascades.
///
/// When enabled, only cascades with exactly `required_multiplicity` gammas
/// whose summed energy strictly exceeds `min_total_energy_mev` pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterPolicy {
    pub enabled: bool,
    pub required_multiplicity: usize,
    pub min_total_energy_mev: f64,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            required_multiplicity: DEFAULT_REQUIRED_MULTIPLICITY,
            min_total_energy_mev: DEFAULT_MIN_TOTAL_ENERGY_MEV,
        }
    }
}

impl FilterPolicy {
    /// The high-energy two-gamma filter with default thresholds.
    #[must_use]
    pub fn two_gamma_only() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Whether a non-empty gamma list passes the filter.
    #[must_use]
    pub fn accepts(&self, energies: &[f64]) -> bool {
        if !self.enabled {
            return true;
        }
        energies.len() == self.required_multiplicity
            && energies.iter().sum::<f64>() > self.min_total_energy_mev
    }
}
