use gammagen_core::EmissionSink;
use gammagen_data::{ParticleKind, Vec3};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// One emitted primary as written to the output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
    pub worker: usize,
    pub event: u64,
    pub particle: String,
    pub energy_mev: f64,
    pub direction: [f64; 3],
    pub position: [f64; 3],
    pub time_ns: f64,
}

/// Writes every primary as one JSON object per line.
///
/// The first write error is kept and reported by [`JsonLinesSink::finish`];
/// later emissions are dropped.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    worker: usize,
    event: u64,
    written: u64,
    error: Option<std::io::Error>,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W, worker: usize) -> Self {
        Self {
            writer,
            worker,
            event: 0,
            written: 0,
            error: None,
        }
    }

    /// Tags following emissions with `event`.
    pub fn set_event(&mut self, event: u64) {
        self.event = event;
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn finish(mut self) -> anyhow::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e.into());
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_record(&mut self, record: &EmissionRecord) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")
    }
}

impl<W: Write> EmissionSink for JsonLinesSink<W> {
    fn emit_primary(
        &mut self,
        kind: &ParticleKind,
        energy_mev: f64,
        direction: Vec3,
        position: Vec3,
        time_ns: f64,
    ) {
        if self.error.is_some() {
            return;
        }
        let record = EmissionRecord {
            worker: self.worker,
            event: self.event,
            particle: kind.to_string(),
            energy_mev,
            direction: direction.to_array(),
            position: position.to_array(),
            time_ns,
        };
        match self.write_record(&record) {
            Ok(()) => self.written += 1,
            Err(e) => self.error = Some(e),
        }
    }
}

/// Counts primaries and sums their energy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TallySink {
    pub primaries: u64,
    pub gammas: u64,
    pub energy_sum_mev: f64,
    pub max_energy_mev: f64,
}

impl TallySink {
    pub fn merge(&mut self, other: &TallySink) {
        self.primaries += other.primaries;
        self.gammas += other.gammas;
        self.energy_sum_mev += other.energy_sum_mev;
        self.max_energy_mev = self.max_energy_mev.max(other.max_energy_mev);
    }

    pub fn mean_energy_mev(&self) -> Option<f64> {
        (self.primaries > 0).then(|| self.energy_sum_mev / self.primaries as f64)
    }
}

impl EmissionSink for TallySink {
    fn emit_primary(
        &mut self,
        kind: &ParticleKind,
        energy_mev: f64,
        _direction: Vec3,
        _position: Vec3,
        _time_ns: f64,
    ) {
        self.primaries += 1;
        if *kind == ParticleKind::Gamma {
            self.gammas += 1;
        }
        self.energy_sum_mev += energy_mev;
        self.max_energy_mev = self.max_energy_mev.max(energy_mev);
    }
}
