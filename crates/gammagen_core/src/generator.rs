use crate::cascade::{CascadeAdapter, DeexcitationModel};
use crate::config::{GeneratorConfig, Verbosity};
use crate::error::GeneratorError;
use crate::reader::{CascadeFileReader, ReaderCursor};
use crate::sampler::{isotropic_direction, FixedLineSampler, SourcePosition};
use crate::sink::EmissionSink;
use gammagen_data::isotope::default_capture;
use gammagen_data::{FilterPolicy, GammaEmission, GenerationMode, IsotopeKey, Vec3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use std::path::PathBuf;

const PROGRESS_INTERVAL: u64 = 50_000;
const ERROR_LOG_BURST: u64 = 10;
const ERROR_LOG_INTERVAL: u64 = 10_000;

/// Successful events per generation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeCounts {
    pub fixed_pair: u64,
    pub single_line: u64,
    pub external_cascade: u64,
    pub file_cascade: u64,
}

impl ModeCounts {
    pub fn record(&mut self, mode: GenerationMode) {
        *self.slot(mode) += 1;
    }

    #[must_use]
    pub fn get(&self, mode: GenerationMode) -> u64 {
        match mode {
            GenerationMode::FixedPair => self.fixed_pair,
            GenerationMode::SingleLine => self.single_line,
            GenerationMode::ExternalCascade => self.external_cascade,
            GenerationMode::FileCascade => self.file_cascade,
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        GenerationMode::ALL.iter().map(|m| self.get(*m)).sum()
    }

    fn slot(&mut self, mode: GenerationMode) -> &mut u64 {
        match mode {
            GenerationMode::FixedPair => &mut self.fixed_pair,
            GenerationMode::SingleLine => &mut self.single_line,
            GenerationMode::ExternalCascade => &mut self.external_cascade,
            GenerationMode::FileCascade => &mut self.file_cascade,
        }
    }
}

impl AddAssign for ModeCounts {
    fn add_assign(&mut self, rhs: Self) {
        for mode in GenerationMode::ALL {
            *self.slot(mode) += rhs.get(mode);
        }
    }
}

/// Counters of one generator instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorStats {
    /// Calls to `generate_event`, failed ones included.
    pub events: u64,
    pub gammas: u64,
    pub failures: u64,
    pub mode_counts: ModeCounts,
    pub skipped_records: u64,
    pub empty_records: u64,
    pub dataset_wraps: u64,
}

impl AddAssign for GeneratorStats {
    fn add_assign(&mut self, rhs: Self) {
        self.events += rhs.events;
        self.gammas += rhs.gammas;
        self.failures += rhs.failures;
        self.mode_counts += rhs.mode_counts;
        self.skipped_records += rhs.skipped_records;
        self.empty_records += rhs.empty_records;
        self.dataset_wraps += rhs.dataset_wraps;
    }
}

/// Produces the primary gammas of one event per call.
///
/// One instance per worker: it owns its random stream, its dataset cursor
/// and its cascade adapter, so nothing is shared between workers.
pub struct PrimaryGenerator {
    mode: GenerationMode,
    rng: ChaCha8Rng,
    lines: FixedLineSampler,
    source: SourcePosition,
    adapter: CascadeAdapter,
    isotope: IsotopeKey,
    excitation_mev: f64,
    dataset_path: Option<PathBuf>,
    reader: Option<CascadeFileReader>,
    filter: FilterPolicy,
    verbosity: Verbosity,
    events: u64,
    gammas: u64,
    failures: u64,
    mode_counts: ModeCounts,
    dataset_error_logged: bool,
}

impl std::fmt::Debug for PrimaryGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimaryGenerator")
            .field("mode", &self.mode)
            .field("isotope", &self.isotope)
            .field("excitation_mev", &self.excitation_mev)
            .field("reader", &self.reader)
            .field("events", &self.events)
            .finish()
    }
}

impl PrimaryGenerator {
    #[must_use]
    pub fn new(config: &GeneratorConfig, model: Box<dyn DeexcitationModel>) -> Self {
        Self::for_worker(config, model, 0)
    }

    /// Builds the generator of worker `worker_index`.
    ///
    /// With a configured seed the worker stream is seeded with
    /// `seed + worker_index`; otherwise from entropy.
    #[must_use]
    pub fn for_worker(
        config: &GeneratorConfig,
        model: Box<dyn DeexcitationModel>,
        worker_index: usize,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(worker_index as u64)),
            None => ChaCha8Rng::from_entropy(),
        };

        let adapter = CascadeAdapter::new(model).with_position(config.cascade.position);
        let verbosity = config.verbosity;
        let (isotope, excitation_mev) = resolve_isotope(
            &adapter,
            config.cascade.isotope(),
            config.cascade.excitation_mev,
            config.source.mode == GenerationMode::ExternalCascade,
        );

        let mut generator = Self {
            mode: config.source.mode,
            rng,
            lines: FixedLineSampler::default(),
            source: SourcePosition::at(config.source.position),
            adapter,
            isotope,
            excitation_mev,
            dataset_path: config.dataset.path.clone(),
            reader: None,
            filter: config.dataset.filter(),
            verbosity,
            events: 0,
            gammas: 0,
            failures: 0,
            mode_counts: ModeCounts::default(),
            dataset_error_logged: false,
        };
        if generator.dataset_path.is_some() {
            generator.open_dataset();
        }

        if !verbosity.is_quiet() {
            tracing::debug!(
                worker = worker_index,
                mode = %generator.mode,
                %isotope,
                excitation_mev,
                model = generator.adapter.model_name(),
                "Primary generator ready"
            );
        }
        generator
    }

    /// Replaces the dataset reader, e.g. with one over a shared snapshot.
    #[must_use]
    pub fn with_reader(mut self, reader: CascadeFileReader) -> Self {
        self.filter = reader.filter();
        self.reader = Some(reader);
        self.dataset_error_logged = false;
        self
    }

    /// Generates the gammas of one event in the current mode.
    pub fn generate_event(&mut self) -> Result<Vec<GammaEmission>, GeneratorError> {
        let position = self.source.source_position();
        let result = match self.mode {
            GenerationMode::FixedPair => Ok(self.lines.fixed_pair(&mut self.rng, position).to_vec()),
            GenerationMode::SingleLine => {
                let energy = self.lines.single_line(&mut self.rng);
                let direction = isotropic_direction(&mut self.rng);
                Ok(vec![GammaEmission::prompt(energy, direction, position)])
            }
            GenerationMode::ExternalCascade => {
                self.adapter
                    .emit(self.isotope, self.excitation_mev, &mut self.rng)
            }
            GenerationMode::FileCascade => self.file_cascade(position),
        };

        self.events += 1;
        match &result {
            Ok(gammas) => {
                self.gammas += gammas.len() as u64;
                self.mode_counts.record(self.mode);
            }
            Err(_) => self.failures += 1,
        }
        result
    }

    fn file_cascade(&mut self, position: Vec3) -> Result<Vec<GammaEmission>, GeneratorError> {
        let reader = self
            .reader
            .as_mut()
            .ok_or(GeneratorError::DatasetUnavailable)?;
        let cascade = reader.next_cascade()?;
        Ok(cascade
            .energies()
            .iter()
            .map(|&energy| {
                GammaEmission::prompt(energy, isotropic_direction(&mut self.rng), position)
            })
            .collect())
    }

    /// Generates one event and forwards its gammas to `sink`.
    ///
    /// Returns the number of gammas emitted. A failed event is logged and
    /// emits nothing.
    pub fn generate_primaries(&mut self, sink: &mut dyn EmissionSink) -> usize {
        let emitted = match self.generate_event() {
            Ok(gammas) => {
                for gamma in &gammas {
                    sink.emit_gamma(gamma);
                }
                gammas.len()
            }
            Err(e) => {
                if self.should_log_failure(&e) {
                    tracing::error!(
                        mode = %self.mode,
                        event = self.events,
                        failures = self.failures,
                        "Event generation failed: {e}"
                    );
                }
                0
            }
        };

        if !self.verbosity.is_quiet() && self.events % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                events = self.events,
                gammas = self.gammas,
                mode = %self.mode,
                "Generated events"
            );
        }
        emitted
    }

    /// Dataset-fatal errors repeat identically on every event, so they are
    /// logged once until a reader is available again. Other failures follow
    /// the burst then interval rule.
    fn should_log_failure(&mut self, err: &GeneratorError) -> bool {
        if err.is_dataset_fatal() {
            let first = !self.dataset_error_logged;
            self.dataset_error_logged = true;
            return first;
        }
        self.failures <= ERROR_LOG_BURST || self.failures % ERROR_LOG_INTERVAL == 0
    }

    /// Switches the generation mode.
    ///
    /// Selecting file-cascade mode opens the configured dataset if it is not
    /// open yet. Selecting the current mode changes nothing else.
    pub fn set_mode(&mut self, mode: GenerationMode) {
        if mode == GenerationMode::FileCascade && self.reader.is_none() {
            if self.dataset_path.is_some() {
                self.open_dataset();
            } else {
                tracing::warn!("File-cascade mode selected but no dataset is configured");
            }
        }
        if mode == self.mode {
            return;
        }
        if !self.verbosity.is_quiet() {
            tracing::info!(from = %self.mode, to = %mode, "Generation mode changed");
        }
        self.mode = mode;
    }

    fn open_dataset(&mut self) -> bool {
        let Some(path) = self.dataset_path.as_ref() else {
            return false;
        };
        match CascadeFileReader::open(path, self.filter, self.verbosity) {
            Ok(reader) => {
                self.reader = Some(reader);
                self.dataset_error_logged = false;
                true
            }
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    "File-cascade mode unavailable: {e}"
                );
                false
            }
        }
    }

    /// Sets the isotope used by external-cascade mode. No fallback applies.
    pub fn set_isotope(&mut self, isotope: IsotopeKey) {
        self.isotope = isotope;
    }

    pub fn set_excitation(&mut self, excitation_mev: f64) {
        self.excitation_mev = excitation_mev;
    }

    pub fn set_cascade_position(&mut self, position: Vec3) {
        self.adapter.set_position(position);
    }

    pub fn set_filter(&mut self, filter: FilterPolicy) {
        self.filter = filter;
        if let Some(reader) = self.reader.as_mut() {
            reader.set_filter(filter);
        }
    }

    #[must_use]
    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    #[must_use]
    pub fn isotope(&self) -> IsotopeKey {
        self.isotope
    }

    #[must_use]
    pub fn excitation_mev(&self) -> f64 {
        self.excitation_mev
    }

    #[must_use]
    pub fn filter(&self) -> FilterPolicy {
        self.filter
    }

    #[must_use]
    pub fn events_generated(&self) -> u64 {
        self.events
    }

    #[must_use]
    pub fn dataset_available(&self) -> bool {
        self.reader.is_some()
    }

    #[must_use]
    pub fn reader_cursor(&self) -> Option<ReaderCursor> {
        self.reader.as_ref().map(CascadeFileReader::cursor)
    }

    #[must_use]
    pub fn stats(&self) -> GeneratorStats {
        let cursor = self.reader_cursor().unwrap_or_default();
        GeneratorStats {
            events: self.events,
            gammas: self.gammas,
            failures: self.failures,
            mode_counts: self.mode_counts,
            skipped_records: cursor.skipped_count,
            empty_records: cursor.empty_count,
            dataset_wraps: cursor.wraps,
        }
    }
}

impl Drop for PrimaryGenerator {
    fn drop(&mut self) {
        if let Some(reader) = &self.reader {
            let cursor = reader.cursor();
            if !self.verbosity.is_quiet() {
                tracing::info!(
                    source = %reader.source_label(),
                    skipped = cursor.skipped_count,
                    empty = cursor.empty_count,
                    wraps = cursor.wraps,
                    two_gamma_only = self.filter.enabled,
                    "Cascade reader closed"
                );
            }
        }
    }
}

/// Falls back to Cl-36 capture when the model lacks the configured isotope.
fn resolve_isotope(
    adapter: &CascadeAdapter,
    isotope: IsotopeKey,
    excitation_mev: f64,
    warn: bool,
) -> (IsotopeKey, f64) {
    if adapter.has_data(isotope) {
        return (isotope, excitation_mev);
    }
    let (fallback, fallback_excitation) = default_capture();
    if isotope == fallback || !adapter.has_data(fallback) {
        return (isotope, excitation_mev);
    }
    if warn {
        tracing::warn!(
            requested = %isotope,
            using = %fallback,
            excitation_mev = fallback_excitation,
            "No de-excitation data for requested isotope, falling back"
        );
    } else {
        tracing::debug!(requested = %isotope, using = %fallback, "Capture isotope fallback");
    }
    (fallback, fallback_excitation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gammagen_data::{CascadeRecord, EmittedParticle, ExcitedNucleus};
    use gammagen_io::CascadeDataset;
    use rand::RngCore;

    /// Knows Cl-36 only and always emits two fixed gammas plus an electron.
    struct StubModel;

    impl DeexcitationModel for StubModel {
        fn has_data(&self, isotope: IsotopeKey) -> bool {
            isotope == IsotopeKey::CL36
        }

        fn generate(
            &mut self,
            nucleus: &ExcitedNucleus,
            _rng: &mut dyn RngCore,
        ) -> Result<Vec<EmittedParticle>, GeneratorError> {
            Ok(vec![
                EmittedParticle::gamma(Vec3::new(0.0, 0.0, 5.0)),
                EmittedParticle::electron(Vec3::new(0.0, 1.0, 0.0)),
                EmittedParticle::gamma(Vec3::new(nucleus.excitation_mev - 5.0, 0.0, 0.0)),
            ])
        }
    }

    /// Knows nothing.
    struct EmptyModel;

    impl DeexcitationModel for EmptyModel {
        fn has_data(&self, _isotope: IsotopeKey) -> bool {
            false
        }

        fn generate(
            &mut self,
            _nucleus: &ExcitedNucleus,
            _rng: &mut dyn RngCore,
        ) -> Result<Vec<EmittedParticle>, GeneratorError> {
            Ok(Vec::new())
        }
    }

    fn quiet_config(seed: u64) -> GeneratorConfig {
        let mut config = GeneratorConfig::default();
        config.seed = Some(seed);
        config.verbosity = Verbosity::Quiet;
        config
    }

    fn temp_dataset(records: &[&[f64]]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("gammagen_gen_{}.jsonl", uuid::Uuid::new_v4()));
        let records = records
            .iter()
            .map(|r| CascadeRecord::new(r.to_vec()))
            .collect::<Vec<_>>();
        CascadeDataset::write_json_lines(&records, &path).unwrap();
        path
    }

    fn records_reader(records: &[&[f64]], filter: FilterPolicy) -> CascadeFileReader {
        let records = records
            .iter()
            .map(|r| CascadeRecord::new(r.to_vec()))
            .collect::<Vec<_>>();
        CascadeFileReader::new(records, filter).with_verbosity(Verbosity::Quiet)
    }

    #[test]
    fn test_default_mode_is_fixed_pair() {
        let mut generator = PrimaryGenerator::new(&quiet_config(1), Box::new(StubModel));
        assert_eq!(generator.mode(), GenerationMode::FixedPair);

        let gammas = generator.generate_event().unwrap();
        let energies: Vec<f64> = gammas.iter().map(|g| g.energy_mev()).collect();
        assert_eq!(energies, vec![1.173, 1.332]);
    }

    #[test]
    fn test_single_line_mode() {
        let mut generator = PrimaryGenerator::new(&quiet_config(1), Box::new(StubModel));
        generator.set_mode(GenerationMode::SingleLine);
        for _ in 0..50 {
            let gammas = generator.generate_event().unwrap();
            assert_eq!(gammas.len(), 1);
            assert!(gammas[0].energy_mev() == 1.173 || gammas[0].energy_mev() == 1.332);
        }
        assert_eq!(generator.stats().mode_counts.single_line, 50);
        assert_eq!(generator.stats().mode_counts.fixed_pair, 0);
    }

    #[test]
    fn test_external_cascade_keeps_gammas_at_cascade_position() {
        let mut config = quiet_config(1);
        config.source.mode = GenerationMode::ExternalCascade;
        config.cascade.position = Vec3::new(0.0, 0.0, -3.0);
        let mut generator = PrimaryGenerator::new(&config, Box::new(StubModel));

        let gammas = generator.generate_event().unwrap();
        assert_eq!(gammas.len(), 2);
        let total: f64 = gammas.iter().map(|g| g.energy_mev()).sum();
        assert!((total - 8.579).abs() < 1e-9);
        assert!(gammas.iter().all(|g| g.position() == Vec3::new(0.0, 0.0, -3.0)));
    }

    #[test]
    fn test_unknown_isotope_falls_back_to_cl36() {
        let mut config = quiet_config(1);
        config.source.mode = GenerationMode::ExternalCascade;
        config.cascade.z = 26;
        config.cascade.a = 57;
        config.cascade.excitation_mev = 7.646;

        let generator = PrimaryGenerator::new(&config, Box::new(StubModel));
        assert_eq!(generator.isotope(), IsotopeKey::CL36);
        assert_eq!(generator.excitation_mev(), 8.579);
    }

    #[test]
    fn test_explicit_isotope_without_data_fails_per_event() {
        let mut generator = PrimaryGenerator::new(&quiet_config(1), Box::new(StubModel));
        generator.set_mode(GenerationMode::ExternalCascade);
        generator.set_isotope(IsotopeKey::new(26, 57));

        let mut sink: Vec<GammaEmission> = Vec::new();
        assert_eq!(generator.generate_primaries(&mut sink), 0);
        assert!(sink.is_empty());
        assert_eq!(generator.stats().failures, 1);
        assert!(matches!(
            generator.generate_event(),
            Err(GeneratorError::NoIsotopeData { z: 26, a: 57 })
        ));
    }

    #[test]
    fn test_model_without_any_data_keeps_configured_isotope() {
        let mut config = quiet_config(1);
        config.source.mode = GenerationMode::ExternalCascade;
        let mut generator = PrimaryGenerator::new(&config, Box::new(EmptyModel));
        assert_eq!(generator.isotope(), IsotopeKey::CL36);
        assert!(matches!(
            generator.generate_event(),
            Err(GeneratorError::NoIsotopeData { z: 17, a: 36 })
        ));
    }

    #[test]
    fn test_file_cascade_without_dataset_is_unavailable() {
        let mut generator = PrimaryGenerator::new(&quiet_config(1), Box::new(StubModel));
        generator.set_mode(GenerationMode::FileCascade);
        assert_eq!(generator.mode(), GenerationMode::FileCascade);
        assert_eq!(
            generator.generate_event().unwrap_err(),
            GeneratorError::DatasetUnavailable
        );
        assert!(!generator.dataset_available());
    }

    #[test]
    fn test_file_cascade_emits_one_gamma_per_energy() {
        let mut config = quiet_config(1);
        config.source.position = Vec3::new(1.0, 0.0, 0.0);
        let mut generator = PrimaryGenerator::new(&config, Box::new(StubModel))
            .with_reader(records_reader(&[&[], &[1.0, 2.0], &[3.0]], FilterPolicy::default()));
        generator.set_mode(GenerationMode::FileCascade);

        let first = generator.generate_event().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].energy_mev(), 1.0);
        assert_eq!(first[1].energy_mev(), 2.0);
        assert!(first.iter().all(|g| g.position() == Vec3::new(1.0, 0.0, 0.0)));
        assert!(first.iter().all(|g| g.time_ns() == 0.0));

        assert_eq!(generator.generate_event().unwrap().len(), 1);
        assert_eq!(generator.generate_event().unwrap().len(), 2);

        let stats = generator.stats();
        assert_eq!(stats.mode_counts.file_cascade, 3);
        assert_eq!(stats.gammas, 5);
        assert_eq!(stats.dataset_wraps, 1);
    }

    #[test]
    fn test_set_filter_reaches_reader() {
        let mut generator = PrimaryGenerator::new(&quiet_config(1), Box::new(StubModel))
            .with_reader(records_reader(&[&[], &[1.0, 2.0], &[3.0]], FilterPolicy::default()));
        generator.set_mode(GenerationMode::FileCascade);
        generator.set_filter(FilterPolicy::two_gamma_only());

        assert!(matches!(
            generator.generate_event(),
            Err(GeneratorError::ExhaustedDataset { total_records: 3, .. })
        ));
        assert!(generator.filter().enabled);
    }

    #[test]
    fn test_dataset_opened_at_construction() {
        let path = temp_dataset(&[&[4.0, 2.0]]);
        let mut config = quiet_config(1);
        config.dataset.path = Some(path.clone());
        config.source.mode = GenerationMode::FileCascade;

        let mut generator = PrimaryGenerator::new(&config, Box::new(StubModel));
        assert!(generator.dataset_available());
        assert_eq!(generator.generate_event().unwrap().len(), 2);
        assert_eq!(generator.reader_cursor().unwrap().total_records, 1);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_dataset_opened_lazily_on_mode_switch() {
        let path = std::env::temp_dir().join(format!("gammagen_lazy_{}.jsonl", uuid::Uuid::new_v4()));
        let mut config = quiet_config(1);
        config.dataset.path = Some(path.clone());

        // Missing at construction
        let mut generator = PrimaryGenerator::new(&config, Box::new(StubModel));
        assert!(!generator.dataset_available());

        CascadeDataset::write_json_lines(&[CascadeRecord::new(vec![0.5])], &path).unwrap();
        generator.set_mode(GenerationMode::FileCascade);
        assert!(generator.dataset_available());
        assert_eq!(generator.generate_event().unwrap()[0].energy_mev(), 0.5);

        // Re-selecting keeps the open reader and its cursor
        generator.set_mode(GenerationMode::FileCascade);
        assert_eq!(generator.reader_cursor().unwrap().current_index, 1);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_reselecting_file_cascade_opens_missing_dataset() {
        let path = std::env::temp_dir().join(format!("gammagen_reopen_{}.jsonl", uuid::Uuid::new_v4()));
        let mut config = quiet_config(1);
        config.dataset.path = Some(path.clone());
        config.source.mode = GenerationMode::FileCascade;

        let mut generator = PrimaryGenerator::new(&config, Box::new(StubModel));
        assert!(!generator.dataset_available());
        assert_eq!(
            generator.generate_event().unwrap_err(),
            GeneratorError::DatasetUnavailable
        );

        CascadeDataset::write_json_lines(&[CascadeRecord::new(vec![0.5])], &path).unwrap();
        // Already the current mode, but the dataset still gets opened
        generator.set_mode(GenerationMode::FileCascade);
        assert!(generator.dataset_available());
        assert_eq!(generator.mode(), GenerationMode::FileCascade);
        assert_eq!(generator.generate_event().unwrap()[0].energy_mev(), 0.5);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unavailable_dataset_is_logged_once() {
        let mut generator = PrimaryGenerator::new(&quiet_config(1), Box::new(StubModel));
        generator.set_mode(GenerationMode::FileCascade);

        let mut sink: Vec<GammaEmission> = Vec::new();
        for _ in 0..1000 {
            assert_eq!(generator.generate_primaries(&mut sink), 0);
        }
        assert_eq!(generator.stats().failures, 1000);
        assert!(generator.dataset_error_logged);
        assert!(!generator.should_log_failure(&GeneratorError::DatasetUnavailable));

        // A reader becoming available re-arms the one-time log
        let mut generator = generator.with_reader(records_reader(&[&[1.0]], FilterPolicy::default()));
        assert!(!generator.dataset_error_logged);
        assert!(generator.should_log_failure(&GeneratorError::DatasetUnavailable));
    }

    #[test]
    fn test_other_failures_follow_burst_then_interval() {
        let mut generator = PrimaryGenerator::new(&quiet_config(1), Box::new(StubModel));
        let exhausted = GeneratorError::ExhaustedDataset {
            total_records: 1,
            skipped: 2,
        };
        generator.failures = ERROR_LOG_BURST;
        assert!(generator.should_log_failure(&exhausted));
        generator.failures = ERROR_LOG_BURST + 1;
        assert!(!generator.should_log_failure(&exhausted));
        generator.failures = ERROR_LOG_INTERVAL;
        assert!(generator.should_log_failure(&exhausted));
        assert!(!generator.dataset_error_logged);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let config = quiet_config(99);
        let mut a = PrimaryGenerator::new(&config, Box::new(StubModel));
        let mut b = PrimaryGenerator::new(&config, Box::new(StubModel));
        a.set_mode(GenerationMode::SingleLine);
        b.set_mode(GenerationMode::SingleLine);

        for _ in 0..100 {
            assert_eq!(a.generate_event().unwrap(), b.generate_event().unwrap());
        }
    }

    #[test]
    fn test_workers_get_distinct_streams() {
        let config = quiet_config(99);
        let mut a = PrimaryGenerator::for_worker(&config, Box::new(StubModel), 0);
        let mut b = PrimaryGenerator::for_worker(&config, Box::new(StubModel), 1);
        assert_ne!(a.generate_event().unwrap(), b.generate_event().unwrap());
    }

    #[test]
    fn test_stats_accumulate() {
        let mut total = GeneratorStats::default();
        let mut one = GeneratorStats::default();
        one.events = 3;
        one.mode_counts.record(GenerationMode::FixedPair);
        total += one;
        total += one;
        assert_eq!(total.events, 6);
        assert_eq!(total.mode_counts.fixed_pair, 2);
        assert_eq!(total.mode_counts.total(), 2);
    }
}
