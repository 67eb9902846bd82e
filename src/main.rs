use anyhow::Result;
use clap::Parser;
use gammagen_core::{init_logging, GeneratorConfig, Verbosity};
use gammagen_data::GenerationMode;
use gammagen_lib::app::{run, RunOptions};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Primary gamma event generator", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Generation mode (co60, single, cascade, rainier or the kebab-case names)
    #[arg(short, long)]
    mode: Option<GenerationMode>,

    /// Number of events to generate
    #[arg(short = 'n', long, default_value_t = 1000)]
    events: u64,

    /// Worker threads (0 = all cores)
    #[arg(short = 't', long, default_value_t = 0)]
    threads: usize,

    /// Base seed; worker i uses seed + i
    #[arg(long)]
    seed: Option<u64>,

    /// Pre-computed cascade dataset (JSON Lines, optionally .gz)
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Capture isotope for external cascades
    #[arg(long, num_args = 2, value_names = ["Z", "A"])]
    isotope: Option<Vec<u32>>,

    /// Excitation energy in MeV for external cascades
    #[arg(long)]
    excitation: Option<f64>,

    /// Accept only dataset cascades of exactly two gammas above 5.4 MeV total
    #[arg(long)]
    two_gamma_only: bool,

    /// Write every emitted primary to this JSON Lines file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Debug output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_options(self) -> Result<RunOptions> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)?,
            None => GeneratorConfig::default(),
        };

        if let Some(mode) = self.mode {
            config.source.mode = mode;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(dataset) = self.dataset {
            config.dataset.path = Some(dataset);
        }
        if let Some(&[z, a]) = self.isotope.as_deref() {
            config.cascade.z = z;
            config.cascade.a = a;
        }
        if let Some(excitation) = self.excitation {
            config.cascade.excitation_mev = excitation;
        }
        if self.two_gamma_only {
            config.dataset.two_gamma_only = true;
        }
        if self.quiet {
            config.verbosity = Verbosity::Quiet;
        } else if self.verbose {
            config.verbosity = Verbosity::Verbose;
        }
        config.validate()?;

        Ok(RunOptions {
            config,
            events: self.events,
            threads: self.threads,
            output: self.output,
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let options = args.into_options()?;
    init_logging(options.config.verbosity);

    let summary = run(&options)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
