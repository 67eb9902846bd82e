use gammagen_data::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Isotropic unit vector: cosθ uniform in [-1, 1], φ uniform in [0, 2π).
pub fn isotropic_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let cos_theta: f64 = 2.0 * rng.gen::<f64>() - 1.0;
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = TAU * rng.gen::<f64>();
    Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

/// Point source location.
///
/// Not stochastic: every event starts at the configured point. Extended
/// sources would plug in here.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SourcePosition {
    point: Vec3,
}

impl SourcePosition {
    #[must_use]
    pub fn at(point: Vec3) -> Self {
        Self { point }
    }

    #[must_use]
    pub fn source_position(&self) -> Vec3 {
        self.point
    }
}
