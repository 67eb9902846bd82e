//! Configuration for a generator instance.
//!
//! Maps to a `gammagen.toml` file. Every section has defaults, so an empty
//! file yields the Co-60 paired source at the origin.
//!
//! ## Example `gammagen.toml`
//!
//! ```toml
//! seed = 42
//! verbosity = "quiet"
//!
//! [source]
//! mode = "file-cascade"
//!
//! [cascade]
//! z = 17
//! a = 36
//! excitation_mev = 8.579
//! data_dir = "CapGamData"
//!
//! [dataset]
//! path = "rainier_cascades.jsonl.gz"
//! two_gamma_only = true
//! ```

use gammagen_data::constants::{
    CL36_SEPARATION_ENERGY_MEV, DEFAULT_MIN_TOTAL_ENERGY_MEV, DEFAULT_REQUIRED_MULTIPLICITY,
};
use gammagen_data::{FilterPolicy, GenerationMode, IsotopeKey, Vec3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How chatty a generator is. Errors and warnings are always reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    #[must_use]
    pub fn is_quiet(self) -> bool {
        self == Verbosity::Quiet
    }

    /// Default tracing filter directive for this verbosity.
    #[must_use]
    pub fn filter_directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
        }
    }
}

/// Point source settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SourceConfig {
    /// Initial generation mode.
    pub mode: GenerationMode,
    /// Where Co-60 and dataset gammas start.
    pub position: Vec3,
}

/// Capture cascade settings for the external de-excitation model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CascadeConfig {
    pub z: u32,
    pub a: u32,
    pub excitation_mev: f64,
    /// Directory holding `{Z}-{A}.bin` level files.
    pub data_dir: Option<PathBuf>,
    /// Start from the excitation energy instead of the highest level.
    pub use_raw_excitation: bool,
    /// Where capture cascades are emitted.
    pub position: Vec3,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            z: IsotopeKey::CL36.z,
            a: IsotopeKey::CL36.a,
            excitation_mev: CL36_SEPARATION_ENERGY_MEV,
            data_dir: None,
            use_raw_excitation: false,
            position: Vec3::ZERO,
        }
    }
}

impl CascadeConfig {
    #[must_use]
    pub fn isotope(&self) -> IsotopeKey {
        IsotopeKey::new(self.z, self.a)
    }
}

/// Pre-computed cascade dataset settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DatasetConfig {
    /// Dataset file; without it file-cascade mode is unavailable.
    pub path: Option<PathBuf>,
    pub two_gamma_only: bool,
    pub required_multiplicity: usize,
    pub min_total_energy_mev: f64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: None,
            two_gamma_only: false,
            required_multiplicity: DEFAULT_REQUIRED_MULTIPLICITY,
            min_total_energy_mev: DEFAULT_MIN_TOTAL_ENERGY_MEV,
        }
    }
}

impl DatasetConfig {
    #[must_use]
    pub fn filter(&self) -> FilterPolicy {
        FilterPolicy {
            enabled: self.two_gamma_only,
            required_multiplicity: self.required_multiplicity,
            min_total_energy_mev: self.min_total_energy_mev,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Base seed; `None` seeds every instance from entropy.
    pub seed: Option<u64>,
    pub verbosity: Verbosity,
    pub source: SourceConfig,
    pub cascade: CascadeConfig,
    pub dataset: DatasetConfig,
}

impl GeneratorConfig {
    /// Validates all configuration parameters.
    ///
    /// # Validation Rules
    /// - Isotope must have `0 < Z <= A`
    /// - Excitation energy must be positive and finite
    /// - Positions must be finite
    /// - Filter multiplicity must be positive and its threshold non-negative
    /// - File-cascade as the initial mode needs a dataset path
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.cascade.z > 0, "Cascade Z must be positive");
        anyhow::ensure!(
            self.cascade.a >= self.cascade.z,
            "Cascade A must be at least Z (got Z={} A={})",
            self.cascade.z,
            self.cascade.a
        );
        anyhow::ensure!(
            self.cascade.excitation_mev.is_finite() && self.cascade.excitation_mev > 0.0,
            "Excitation energy must be positive"
        );
        anyhow::ensure!(
            is_finite(&self.source.position) && is_finite(&self.cascade.position),
            "Source and cascade positions must be finite"
        );
        anyhow::ensure!(
            self.dataset.required_multiplicity > 0,
            "Required multiplicity must be positive"
        );
        anyhow::ensure!(
            self.dataset.min_total_energy_mev.is_finite()
                && self.dataset.min_total_energy_mev >= 0.0,
            "Minimum total energy must be non-negative"
        );
        anyhow::ensure!(
            self.source.mode != GenerationMode::FileCascade || self.dataset.path.is_some(),
            "File-cascade mode needs [dataset] path"
        );
        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the TOML file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read config {}: {e}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Hash of the settings that shape the generated physics.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.source).as_bytes());
        hasher.update(format!("{:?}", self.cascade).as_bytes());
        hasher.update(format!("{:?}", self.dataset).as_bytes());
        hasher.update(format!("{:?}", self.seed).as_bytes());
        hex::encode(hasher.finalize())
    }
}

fn is_finite(v: &Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.source.mode, GenerationMode::FixedPair);
        assert_eq!(config.cascade.isotope(), IsotopeKey::CL36);
        assert!(!config.dataset.filter().enabled);
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = GeneratorConfig::from_toml("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn test_toml_sections() {
        let config = GeneratorConfig::from_toml(
            r#"
            seed = 7
            verbosity = "quiet"

            [source]
            mode = "file-cascade"

            [cascade]
            z = 26
            a = 57
            excitation_mev = 7.646

            [dataset]
            path = "cascades.jsonl"
            two_gamma_only = true
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(7));
        assert!(config.verbosity.is_quiet());
        assert_eq!(config.source.mode, GenerationMode::FileCascade);
        assert_eq!(config.cascade.isotope(), IsotopeKey::new(26, 57));
        let filter = config.dataset.filter();
        assert!(filter.enabled);
        assert_eq!(filter.required_multiplicity, 2);
        assert_eq!(filter.min_total_energy_mev, 5.4);
    }

    #[test]
    fn test_file_cascade_without_path_is_rejected() {
        let result = GeneratorConfig::from_toml("[source]\nmode = \"file-cascade\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_isotope_is_rejected() {
        let mut config = GeneratorConfig::default();
        config.cascade.a = 10;
        config.cascade.z = 17;
        assert!(config.validate().is_err());

        let mut config = GeneratorConfig::default();
        config.cascade.excitation_mev = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fingerprint_tracks_physics_settings() {
        let a = GeneratorConfig::default();
        let mut b = GeneratorConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.dataset.two_gamma_only = true;
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = GeneratorConfig::default();
        config.seed = Some(3);
        config.dataset.path = Some(PathBuf::from("x.jsonl"));
        let text = config.to_toml().unwrap();
        assert_eq!(GeneratorConfig::from_toml(&text).unwrap(), config);
    }
}
