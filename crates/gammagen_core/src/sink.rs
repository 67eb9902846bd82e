use gammagen_data::{GammaEmission, ParticleKind, Vec3};

/// Receives primaries for injection into the surrounding simulation.
pub trait EmissionSink {
    fn emit_primary(
        &mut self,
        kind: &ParticleKind,
        energy_mev: f64,
        direction: Vec3,
        position: Vec3,
        time_ns: f64,
    );

    /// Forwards one generated gamma.
    fn emit_gamma(&mut self, gamma: &GammaEmission) {
        self.emit_primary(
            &ParticleKind::Gamma,
            gamma.energy_mev(),
            gamma.direction(),
            gamma.position(),
            gamma.time_ns(),
        );
    }
}

/// Collects gammas in memory. Non-gamma primaries are ignored.
impl EmissionSink for Vec<GammaEmission> {
    fn emit_primary(
        &mut self,
        kind: &ParticleKind,
        energy_mev: f64,
        direction: Vec3,
        position: Vec3,
        time_ns: f64,
    ) {
        if *kind == ParticleKind::Gamma {
            self.push(GammaEmission::new(energy_mev, direction, position, time_ns));
        }
    }
}
