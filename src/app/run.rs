use super::sink::{JsonLinesSink, TallySink};
use anyhow::Context;
use chrono::{DateTime, Utc};
use gammagen_core::{
    CascadeFileReader, EmissionSink, GeneratorConfig, GeneratorStats, LevelSchemeModel,
    PrimaryGenerator,
};
use gammagen_data::{GenerationMode, ParticleKind, Vec3};
use gammagen_io::CascadeDataset;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// What to run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: GeneratorConfig,
    pub events: u64,
    /// Worker count; 0 uses every available core.
    pub threads: usize,
    /// JSON Lines file receiving every emitted primary.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerReport {
    pub worker: usize,
    pub events: u64,
    pub stats: GeneratorStats,
    pub tally: TallySink,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub mode: GenerationMode,
    pub events_requested: u64,
    pub workers: usize,
    pub config_fingerprint: String,
    pub dataset_fingerprint: Option<String>,
    pub stats: GeneratorStats,
    pub tally: TallySink,
    pub output: Option<PathBuf>,
    pub reports: Vec<WorkerReport>,
}

/// Splits `events` over `workers` as evenly as possible, earlier workers
/// taking the remainder.
pub fn split_events(events: u64, workers: usize) -> Vec<u64> {
    if workers == 0 {
        return Vec::new();
    }
    let n = workers as u64;
    let base = events / n;
    let extra = events % n;
    (0..n).map(|i| base + u64::from(i < extra)).collect()
}

/// Runs `options.events` events over a rayon pool, one generator per worker.
pub fn run(options: &RunOptions) -> anyhow::Result<RunSummary> {
    let config = &options.config;
    config.validate()?;

    let started_at = Utc::now();
    let run_id = Uuid::new_v4();
    let workers = if options.threads == 0 {
        rayon::current_num_threads()
    } else {
        options.threads
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("Failed to build worker pool")?;

    let dataset = open_shared_dataset(config)?;
    let model = LevelSchemeModel::discover(config.cascade.data_dir.as_deref())
        .with_raw_excitation(config.cascade.use_raw_excitation);

    tracing::info!(
        %run_id,
        mode = %config.source.mode,
        events = options.events,
        workers,
        fingerprint = %config.fingerprint(),
        "Starting generation run"
    );

    let shares = split_events(options.events, workers);
    let reports = pool.install(|| {
        shares
            .par_iter()
            .enumerate()
            .map(|(worker, &events)| {
                let part = options.output.as_deref().map(|out| part_path(out, worker));
                run_worker(config, &model, dataset.as_ref(), worker, events, part.as_deref())
            })
            .collect::<anyhow::Result<Vec<_>>>()
    });

    let reports = match (reports, &options.output) {
        (Ok(reports), Some(output)) => match merge_parts(output, workers) {
            Ok(()) => reports,
            Err(e) => {
                remove_parts(output, workers);
                let _ = std::fs::remove_file(output);
                return Err(e);
            }
        },
        (Ok(reports), None) => reports,
        (Err(e), output) => {
            if let Some(output) = output {
                remove_parts(output, workers);
            }
            return Err(e);
        }
    };

    let mut stats = GeneratorStats::default();
    let mut tally = TallySink::default();
    for report in &reports {
        stats += report.stats;
        tally.merge(&report.tally);
    }

    let summary = RunSummary {
        run_id,
        started_at,
        finished_at: Utc::now(),
        mode: config.source.mode,
        events_requested: options.events,
        workers,
        config_fingerprint: config.fingerprint(),
        dataset_fingerprint: dataset.as_ref().map(|d| d.fingerprint().to_string()),
        stats,
        tally,
        output: options.output.clone(),
        reports,
    };

    tracing::info!(
        %run_id,
        events = summary.stats.events,
        gammas = summary.stats.gammas,
        failures = summary.stats.failures,
        skipped = summary.stats.skipped_records,
        "Generation run finished"
    );
    Ok(summary)
}

/// Loads the dataset once; workers read it through cheap clones.
fn open_shared_dataset(config: &GeneratorConfig) -> anyhow::Result<Option<CascadeDataset>> {
    let Some(path) = config.dataset.path.as_ref() else {
        return Ok(None);
    };
    match CascadeDataset::open(path) {
        Ok(dataset) => {
            tracing::info!(
                file = %path.display(),
                records = dataset.len(),
                fingerprint = %dataset.fingerprint(),
                "Cascade dataset loaded"
            );
            Ok(Some(dataset))
        }
        Err(e) if config.source.mode == GenerationMode::FileCascade => {
            Err(anyhow::Error::new(e).context("File-cascade run needs a readable dataset"))
        }
        Err(e) => {
            tracing::error!(file = %path.display(), "File-cascade mode unavailable: {e}");
            Ok(None)
        }
    }
}

fn run_worker(
    config: &GeneratorConfig,
    model: &LevelSchemeModel,
    dataset: Option<&CascadeDataset>,
    worker: usize,
    events: u64,
    part: Option<&Path>,
) -> anyhow::Result<WorkerReport> {
    // The shared snapshot replaces the per-instance open
    let mut worker_config = config.clone();
    worker_config.dataset.path = None;

    let mut generator = PrimaryGenerator::for_worker(&worker_config, Box::new(model.clone()), worker);
    if let Some(dataset) = dataset {
        let reader = CascadeFileReader::new(dataset.clone(), config.dataset.filter())
            .with_verbosity(config.verbosity);
        generator = generator.with_reader(reader);
    }

    let mut tally = TallySink::default();
    let mut json = match part {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Cannot create {}", path.display()))?;
            Some(JsonLinesSink::new(BufWriter::new(file), worker))
        }
        None => None,
    };

    for event in 0..events {
        let mut tee = Tee {
            tally: &mut tally,
            json: json.as_mut(),
        };
        if let Some(json) = tee.json.as_mut() {
            json.set_event(event);
        }
        generator.generate_primaries(&mut tee);
    }

    if let Some(json) = json {
        json.finish()?;
    }

    Ok(WorkerReport {
        worker,
        events,
        stats: generator.stats(),
        tally,
    })
}

struct Tee<'a> {
    tally: &'a mut TallySink,
    json: Option<&'a mut JsonLinesSink<BufWriter<File>>>,
}

impl EmissionSink for Tee<'_> {
    fn emit_primary(
        &mut self,
        kind: &ParticleKind,
        energy_mev: f64,
        direction: Vec3,
        position: Vec3,
        time_ns: f64,
    ) {
        self.tally
            .emit_primary(kind, energy_mev, direction, position, time_ns);
        if let Some(json) = self.json.as_mut() {
            json.emit_primary(kind, energy_mev, direction, position, time_ns);
        }
    }
}

fn part_path(output: &Path, worker: usize) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(format!(".part{worker}"));
    PathBuf::from(name)
}

/// Concatenates the worker part files into `output` in worker order.
fn merge_parts(output: &Path, workers: usize) -> anyhow::Result<()> {
    let file =
        File::create(output).with_context(|| format!("Cannot create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    for worker in 0..workers {
        let part = part_path(output, worker);
        let mut reader = File::open(&part)
            .with_context(|| format!("Missing worker output {}", part.display()))?;
        std::io::copy(&mut reader, &mut writer)?;
        std::fs::remove_file(&part)?;
    }
    writer.flush()?;
    Ok(())
}

/// Best-effort removal of whatever part files a failed run left behind.
fn remove_parts(output: &Path, workers: usize) {
    for worker in 0..workers {
        let _ = std::fs::remove_file(part_path(output, worker));
    }
}
