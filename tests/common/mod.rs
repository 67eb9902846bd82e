use gammagen_core::{
    CascadeFileReader, CascadeRecord, GeneratorConfig, LevelSchemeModel, PrimaryGenerator,
    Verbosity,
};
use gammagen_data::{FilterPolicy, GenerationMode, IsotopeKey};
use gammagen_io::{CascadeDataset, Level, LevelScheme, Transition, TransitionKind};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A temporary file removed on drop.
#[allow(dead_code)]
pub struct TempFile {
    path: PathBuf,
}

#[allow(dead_code)]
impl TempFile {
    pub fn new(extension: &str) -> Self {
        Self {
            path: std::env::temp_dir().join(format!("gammagen_test_{}.{extension}", Uuid::new_v4())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[allow(dead_code)]
pub fn records(lists: &[&[f64]]) -> Vec<CascadeRecord> {
    lists.iter().map(|l| CascadeRecord::new(l.to_vec())).collect()
}

/// Writes `lists` as a dataset file; gzip-compressed when `gz` is set.
#[allow(dead_code)]
pub fn write_dataset(lists: &[&[f64]], gz: bool) -> TempFile {
    let file = TempFile::new(if gz { "jsonl.gz" } else { "jsonl" });
    CascadeDataset::write_json_lines(&records(lists), file.path()).unwrap();
    file
}

/// Five-level Cl-36-like scheme whose top level sits at 5 MeV.
#[allow(dead_code)]
pub fn toy_scheme() -> LevelScheme {
    let t = |final_level_mev: f64, branching: f64, kind: TransitionKind| Transition {
        final_level_mev,
        branching,
        kind,
    };
    let level = |energy_mev: f64, transitions: Vec<Transition>| Level {
        energy_mev,
        transitions,
    };
    LevelScheme {
        isotope: IsotopeKey::CL36,
        levels: vec![
            level(0.0, vec![]),
            level(0.788, vec![t(0.0, 1.0, TransitionKind::Gamma)]),
            level(
                1.951,
                vec![
                    t(0.788, 0.6, TransitionKind::Gamma),
                    t(0.0, 0.4, TransitionKind::Gamma),
                ],
            ),
            level(
                3.0,
                vec![
                    t(1.951, 0.5, TransitionKind::Gamma),
                    t(0.0, 0.5, TransitionKind::ConversionElectron),
                ],
            ),
            level(
                5.0,
                vec![
                    t(3.0, 0.5, TransitionKind::Gamma),
                    t(1.951, 0.3, TransitionKind::Gamma),
                    t(0.788, 0.2, TransitionKind::Gamma),
                ],
            ),
        ],
    }
}

#[allow(dead_code)]
pub struct GeneratorBuilder {
    config: GeneratorConfig,
    records: Option<Vec<CascadeRecord>>,
    model: LevelSchemeModel,
    worker: usize,
}

#[allow(dead_code)]
impl GeneratorBuilder {
    pub fn new() -> Self {
        let mut config = GeneratorConfig::default();
        config.seed = Some(42);
        config.verbosity = Verbosity::Quiet;
        Self {
            config,
            records: None,
            model: LevelSchemeModel::new(None),
            worker: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.config.source.mode = mode;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut GeneratorConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_records(mut self, lists: &[&[f64]]) -> Self {
        self.records = Some(records(lists));
        self
    }

    pub fn with_two_gamma_only(mut self) -> Self {
        self.config.dataset.two_gamma_only = true;
        self
    }

    pub fn with_scheme(mut self, scheme: LevelScheme) -> Self {
        self.model.insert_scheme(scheme);
        self
    }

    pub fn as_worker(mut self, worker: usize) -> Self {
        self.worker = worker;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn build(self) -> PrimaryGenerator {
        let filter: FilterPolicy = self.config.dataset.filter();
        let generator =
            PrimaryGenerator::for_worker(&self.config, Box::new(self.model), self.worker);
        match self.records {
            Some(records) => generator.with_reader(
                CascadeFileReader::new(records, filter).with_verbosity(Verbosity::Quiet),
            ),
            None => generator,
        }
    }
}
