use crate::error::GeneratorError;
use gammagen_data::{EmittedParticle, ExcitedNucleus, GammaEmission, IsotopeKey, Vec3};
use rand::RngCore;

/// A nuclear de-excitation generator.
///
/// Given an excited nucleus at rest it produces the de-excitation products
/// (gammas, conversion electrons, anything else) as momentum vectors in MeV.
pub trait DeexcitationModel: Send {
    fn has_data(&self, isotope: IsotopeKey) -> bool;

    fn generate(
        &mut self,
        nucleus: &ExcitedNucleus,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<EmittedParticle>, GeneratorError>;

    fn name(&self) -> &str {
        "deexcitation-model"
    }
}

/// Turns de-excitation model output into prompt gamma emissions.
pub struct CascadeAdapter {
    model: Box<dyn DeexcitationModel>,
    position: Vec3,
}

impl std::fmt::Debug for CascadeAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeAdapter")
            .field("model", &self.model.name())
            .field("position", &self.position)
            .finish()
    }
}

impl CascadeAdapter {
    #[must_use]
    pub fn new(model: Box<dyn DeexcitationModel>) -> Self {
        Self {
            model,
            position: Vec3::ZERO,
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    #[must_use]
    pub fn has_data(&self, isotope: IsotopeKey) -> bool {
        self.model.has_data(isotope)
    }

    /// Runs one cascade of `isotope` excited by `excitation_mev`.
    ///
    /// Only gammas are kept. Each keeps the energy and direction of its
    /// momentum and starts at the cascade position at t = 0. Zero-momentum
    /// gammas are dropped.
    pub fn emit(
        &mut self,
        isotope: IsotopeKey,
        excitation_mev: f64,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<GammaEmission>, GeneratorError> {
        if !self.model.has_data(isotope) {
            return Err(GeneratorError::NoIsotopeData {
                z: isotope.z,
                a: isotope.a,
            });
        }

        let nucleus = ExcitedNucleus::at_rest(isotope, excitation_mev);
        let products = self.model.generate(&nucleus, rng)?;

        let gammas = products
            .iter()
            .filter(|p| p.is_gamma())
            .filter_map(|p| {
                let energy = p.momentum_mag();
                let direction = p.momentum.normalized()?;
                Some(GammaEmission::prompt(energy, direction, self.position))
            })
            .collect::<Vec<_>>();

        tracing::trace!(
            %isotope,
            products = products.len(),
            gammas = gammas.len(),
            "Capture cascade generated"
        );
        Ok(gammas)
    }
}
