//! Reference de-excitation model walking CapGam level schemes.

use crate::cascade::DeexcitationModel;
use crate::error::GeneratorError;
use crate::sampler::isotropic_direction;
use gammagen_data::constants::ELECTRON_MASS_MEV;
use gammagen_data::{EmittedParticle, ExcitedNucleus, IsotopeKey};
use gammagen_io::levels::LEVEL_TOLERANCE_MEV;
use gammagen_io::{Level, LevelScheme, TransitionKind};
use rand::{Rng, RngCore};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable naming the level data directory.
pub const DATA_DIR_ENV: &str = "CAPGAM_DATA_DIR";

const FALLBACK_DIRS: [&str; 2] = ["CapGamData", "../CapGamData"];

#[derive(Debug, Clone, Default)]
pub struct LevelSchemeModel {
    data_dir: Option<PathBuf>,
    use_raw_excitation: bool,
    cache: HashMap<IsotopeKey, Arc<LevelScheme>>,
}

impl LevelSchemeModel {
    #[must_use]
    pub fn new(data_dir: Option<PathBuf>) -> Self {
        Self {
            data_dir,
            ..Self::default()
        }
    }

    /// Locates the level data directory.
    ///
    /// Tries `configured`, then `CAPGAM_DATA_DIR`, then `CapGamData` in the
    /// working directory or its parent (only if it holds Cl-36 data).
    #[must_use]
    pub fn discover(configured: Option<&Path>) -> Self {
        let from_env = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
        let found = configured
            .map(Path::to_path_buf)
            .filter(|p| p.is_dir())
            .or_else(|| from_env.filter(|p| p.is_dir()))
            .or_else(|| {
                FALLBACK_DIRS.iter().map(PathBuf::from).find(|dir| {
                    dir.join(LevelScheme::file_name(IsotopeKey::CL36)).is_file()
                })
            });

        match &found {
            Some(dir) => tracing::debug!(dir = %dir.display(), "Using level data directory"),
            None => tracing::warn!(
                "No level data directory found (set {DATA_DIR_ENV}); capture cascades unavailable"
            ),
        }
        Self::new(found)
    }

    /// Start the walk at the excitation energy instead of the top level.
    #[must_use]
    pub fn with_raw_excitation(mut self, enabled: bool) -> Self {
        self.use_raw_excitation = enabled;
        self
    }

    /// Registers an in-memory scheme, bypassing the data directory.
    pub fn insert_scheme(&mut self, scheme: LevelScheme) {
        self.cache.insert(scheme.isotope, Arc::new(scheme));
    }

    #[must_use]
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    fn scheme_path(&self, isotope: IsotopeKey) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(LevelScheme::file_name(isotope)))
    }

    fn scheme(&mut self, isotope: IsotopeKey) -> Result<Arc<LevelScheme>, GeneratorError> {
        if let Some(scheme) = self.cache.get(&isotope) {
            return Ok(Arc::clone(scheme));
        }
        let path = self
            .scheme_path(isotope)
            .ok_or(GeneratorError::NoIsotopeData {
                z: isotope.z,
                a: isotope.a,
            })?;
        let scheme = Arc::new(LevelScheme::load(&path, isotope)?);
        tracing::debug!(
            %isotope,
            file = %path.display(),
            levels = scheme.levels.len(),
            "Loaded level scheme"
        );
        self.cache.insert(isotope, Arc::clone(&scheme));
        Ok(scheme)
    }
}

impl DeexcitationModel for LevelSchemeModel {
    fn has_data(&self, isotope: IsotopeKey) -> bool {
        self.cache.contains_key(&isotope)
            || self
                .scheme_path(isotope)
                .is_some_and(|path| path.is_file())
    }

    fn generate(
        &mut self,
        nucleus: &ExcitedNucleus,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<EmittedParticle>, GeneratorError> {
        let scheme = self.scheme(nucleus.isotope)?;
        walk(&scheme, nucleus.excitation_mev, self.use_raw_excitation, rng)
    }

    fn name(&self) -> &str {
        "capgam-levels"
    }
}

fn walk(
    scheme: &LevelScheme,
    excitation_mev: f64,
    use_raw_excitation: bool,
    rng: &mut dyn RngCore,
) -> Result<Vec<EmittedParticle>, GeneratorError> {
    let mut products = Vec::new();

    let start = if use_raw_excitation {
        let level = scheme.highest_level_below(excitation_mev + LEVEL_TOLERANCE_MEV);
        let floor = level.map_or(0.0, |l| l.energy_mev);
        let excess = excitation_mev - floor;
        if excess > LEVEL_TOLERANCE_MEV {
            products.push(EmittedParticle::gamma(isotropic_direction(rng) * excess));
        }
        level
    } else {
        scheme.top_level()
    };

    let Some(mut current) = start else {
        return Ok(products);
    };

    let max_steps = scheme.levels.len() + 1;
    for _ in 0..max_steps {
        if current.energy_mev <= LEVEL_TOLERANCE_MEV {
            return Ok(products);
        }
        if current.is_continuum() {
            products.push(EmittedParticle::gamma(
                isotropic_direction(rng) * current.energy_mev,
            ));
            return Ok(products);
        }

        let (final_mev, kind) = pick_transition(current, rng)?;
        let delta = current.energy_mev - final_mev;
        if delta <= LEVEL_TOLERANCE_MEV {
            return Err(GeneratorError::LevelScheme(format!(
                "transition from {} MeV to {final_mev} MeV does not lower the energy",
                current.energy_mev
            )));
        }

        let direction = isotropic_direction(rng);
        products.push(match kind {
            TransitionKind::ConversionElectron => {
                let momentum = (delta * delta + 2.0 * ELECTRON_MASS_MEV * delta).sqrt();
                EmittedParticle::electron(direction * momentum)
            }
            _ => EmittedParticle::gamma(direction * delta),
        });

        if final_mev <= LEVEL_TOLERANCE_MEV {
            return Ok(products);
        }
        current = scheme.find_level(final_mev).ok_or_else(|| {
            GeneratorError::LevelScheme(format!("final level {final_mev} MeV is not in the scheme"))
        })?;
    }

    Err(GeneratorError::LevelScheme(format!(
        "cascade did not reach the ground state within {max_steps} steps"
    )))
}

/// Chooses a placed transition by renormalized branching.
fn pick_transition(
    level: &Level,
    rng: &mut dyn RngCore,
) -> Result<(f64, TransitionKind), GeneratorError> {
    let placed = level
        .transitions
        .iter()
        .filter(|t| t.kind.is_placed() && t.branching > 0.0)
        .collect::<Vec<_>>();
    let total: f64 = placed.iter().map(|t| t.branching).sum();
    if placed.is_empty() || !total.is_finite() {
        return Err(GeneratorError::LevelScheme(format!(
            "level at {} MeV has no placed transition",
            level.energy_mev
        )));
    }

    let target = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    for t in &placed {
        cumulative += t.branching;
        if target < cumulative {
            return Ok((t.final_level_mev, t.kind));
        }
    }
    // Rounding can leave target == total
    let last = placed[placed.len() - 1];
    Ok((last.final_level_mev, last.kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gammagen_data::ParticleKind;
    use gammagen_io::Transition;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn t(final_level_mev: f64, branching: f64, kind: TransitionKind) -> Transition {
        Transition {
            final_level_mev,
            branching,
            kind,
        }
    }

    fn level(energy_mev: f64, transitions: Vec<Transition>) -> Level {
        Level {
            energy_mev,
            transitions,
        }
    }

    fn toy_scheme() -> LevelScheme {
        LevelScheme {
            isotope: IsotopeKey::CL36,
            levels: vec![
                level(0.0, vec![]),
                level(1.0, vec![t(0.0, 1.0, TransitionKind::Gamma)]),
                level(
                    3.0,
                    vec![
                        t(1.0, 0.5, TransitionKind::Gamma),
                        t(0.0, 0.5, TransitionKind::ConversionElectron),
                    ],
                ),
                level(
                    5.0,
                    vec![
                        t(3.0, 0.7, TransitionKind::Gamma),
                        t(1.0, 0.3, TransitionKind::Gamma),
                        t(2.0, 0.9, TransitionKind::UnplacedGamma),
                    ],
                ),
            ],
        }
    }

    fn deposited(products: &[EmittedParticle]) -> f64 {
        products
            .iter()
            .map(|p| match p.kind {
                ParticleKind::Electron => {
                    let pm = p.momentum_mag();
                    (pm * pm + ELECTRON_MASS_MEV * ELECTRON_MASS_MEV).sqrt() - ELECTRON_MASS_MEV
                }
                _ => p.momentum_mag(),
            })
            .sum()
    }

    fn model() -> LevelSchemeModel {
        let mut model = LevelSchemeModel::new(None);
        model.insert_scheme(toy_scheme());
        model
    }

    #[test]
    fn test_walk_conserves_top_level_energy() {
        let mut model = model();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let nucleus = ExcitedNucleus::at_rest(IsotopeKey::CL36, 8.579);

        for _ in 0..500 {
            let products = model.generate(&nucleus, &mut rng).unwrap();
            assert!(!products.is_empty() && products.len() <= 3);
            assert!((deposited(&products) - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_walk_uses_conversion_electrons() {
        let mut model = model();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let nucleus = ExcitedNucleus::at_rest(IsotopeKey::CL36, 8.579);
        let electrons = (0..500)
            .flat_map(|_| model.generate(&nucleus, &mut rng).unwrap())
            .filter(|p| p.kind == ParticleKind::Electron)
            .count();
        assert!(electrons > 0);
    }

    #[test]
    fn test_raw_excitation_emits_excess_first() {
        let mut model = model().with_raw_excitation(true);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let nucleus = ExcitedNucleus::at_rest(IsotopeKey::CL36, 4.0);

        for _ in 0..100 {
            let products = model.generate(&nucleus, &mut rng).unwrap();
            assert!((products[0].momentum_mag() - 1.0).abs() < 1e-9);
            assert!((deposited(&products) - 4.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_continuum_level_emits_single_gamma() {
        let mut model = LevelSchemeModel::new(None);
        model.insert_scheme(LevelScheme {
            isotope: IsotopeKey::CL36,
            levels: vec![level(6.0, vec![t(0.0, 1.0, TransitionKind::Continuum)])],
        });
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let nucleus = ExcitedNucleus::at_rest(IsotopeKey::CL36, 8.579);
        let products = model.generate(&nucleus, &mut rng).unwrap();
        assert_eq!(products.len(), 1);
        assert!((products[0].momentum_mag() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_schemes_are_errors() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let nucleus = ExcitedNucleus::at_rest(IsotopeKey::CL36, 8.579);

        let mut unplaced_only = LevelSchemeModel::new(None);
        unplaced_only.insert_scheme(LevelScheme {
            isotope: IsotopeKey::CL36,
            levels: vec![level(2.0, vec![t(0.0, 1.0, TransitionKind::UnplacedGamma)])],
        });
        assert!(matches!(
            unplaced_only.generate(&nucleus, &mut rng),
            Err(GeneratorError::LevelScheme(_))
        ));

        let mut dangling = LevelSchemeModel::new(None);
        dangling.insert_scheme(LevelScheme {
            isotope: IsotopeKey::CL36,
            levels: vec![level(2.0, vec![t(1.5, 1.0, TransitionKind::Gamma)])],
        });
        assert!(matches!(
            dangling.generate(&nucleus, &mut rng),
            Err(GeneratorError::LevelScheme(_))
        ));

        let mut upward = LevelSchemeModel::new(None);
        upward.insert_scheme(LevelScheme {
            isotope: IsotopeKey::CL36,
            levels: vec![level(2.0, vec![t(2.0, 1.0, TransitionKind::Gamma)])],
        });
        assert!(matches!(
            upward.generate(&nucleus, &mut rng),
            Err(GeneratorError::LevelScheme(_))
        ));
    }

    #[test]
    fn test_has_data_from_directory() {
        let dir = std::env::temp_dir().join(format!("gammagen_levels_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        toy_scheme()
            .save(dir.join(LevelScheme::file_name(IsotopeKey::CL36)))
            .unwrap();

        let mut model = LevelSchemeModel::discover(Some(dir.as_path()));
        assert_eq!(model.data_dir(), Some(dir.as_path()));
        assert!(model.has_data(IsotopeKey::CL36));
        assert!(!model.has_data(IsotopeKey::new(26, 57)));

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let nucleus = ExcitedNucleus::at_rest(IsotopeKey::CL36, 8.579);
        let products = model.generate(&nucleus, &mut rng).unwrap();
        assert!((deposited(&products) - 5.0).abs() < 1e-9);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_no_directory_means_no_data() {
        let mut model = LevelSchemeModel::new(None);
        assert!(!model.has_data(IsotopeKey::CL36));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let nucleus = ExcitedNucleus::at_rest(IsotopeKey::CL36, 8.579);
        assert!(matches!(
            model.generate(&nucleus, &mut rng),
            Err(GeneratorError::NoIsotopeData { z: 17, a: 36 })
        ));
    }
}
