//! Physical constants in MeV / ns units.

/// Co-60 gamma lines (MeV).
pub const CO60_LINE_LOW_MEV: f64 = 1.173;
pub const CO60_LINE_HIGH_MEV: f64 = 1.332;

/// Cl-36 neutron separation energy, the default capture excitation (MeV).
pub const CL36_SEPARATION_ENERGY_MEV: f64 = 8.579;

pub const PROTON_MASS_MEV: f64 = 938.272_088;
pub const NEUTRON_MASS_MEV: f64 = 939.565_420;
pub const ELECTRON_MASS_MEV: f64 = 0.510_999;

/// Default two-gamma filter settings.
pub const DEFAULT_REQUIRED_MULTIPLICITY: usize = 2;
pub const DEFAULT_MIN_TOTAL_ENERGY_MEV: f64 = 5.4;

// Semi-empirical mass formula coefficients (MeV)
pub(crate) const SEMF_VOLUME: f64 = 15.75;
pub(crate) const SEMF_SURFACE: f64 = 17.8;
pub(crate) const SEMF_COULOMB: f64 = 0.711;
pub(crate) const SEMF_ASYMMETRY: f64 = 23.7;
pub(crate) const SEMF_PAIRING: f64 = 11.18;
