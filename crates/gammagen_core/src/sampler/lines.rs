use super::angular::isotropic_direction;
use gammagen_data::constants::{CO60_LINE_HIGH_MEV, CO60_LINE_LOW_MEV};
use gammagen_data::{GammaEmission, Vec3};
use rand::Rng;

/// Two-line gamma source (Co-60 by default).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLineSampler {
    low_mev: f64,
    high_mev: f64,
}

impl Default for FixedLineSampler {
    fn default() -> Self {
        Self::new(CO60_LINE_LOW_MEV, CO60_LINE_HIGH_MEV)
    }
}

impl FixedLineSampler {
    #[must_use]
    pub fn new(low_mev: f64, high_mev: f64) -> Self {
        Self { low_mev, high_mev }
    }

    /// Both lines at `position`, independent isotropic directions, t = 0.
    pub fn fixed_pair<R: Rng + ?Sized>(&self, rng: &mut R, position: Vec3) -> [GammaEmission; 2] {
        let first = GammaEmission::prompt(self.low_mev, isotropic_direction(rng), position);
        let second = GammaEmission::prompt(self.high_mev, isotropic_direction(rng), position);
        [first, second]
    }

    /// One line chosen with equal probability from a single uniform draw.
    pub fn single_line<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if rng.gen::<f64>() < 0.5 {
            self.low_mev
        } else {
            self.high_mev
        }
    }
}
