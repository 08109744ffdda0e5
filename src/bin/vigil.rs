//! Vigil CLI - Command-line interface for the trigger engine
//!
//! Commands:
//! - run: stream sensor readings (NDJSON) through the engine
//! - score: compare two feature summary files
//! - config: print the engine configuration

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

use vigil::score::DifferenceScorer;
use vigil::{EngineConfig, FeatureSummary, TriggerEngine, VigilError, VIGIL_VERSION};

/// Vigil - On-device change-and-stability trigger engine
#[derive(Parser)]
#[command(name = "vigil")]
#[command(version = VIGIL_VERSION)]
#[command(about = "Gate expensive scene analysis on change and stability", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream sensor readings through the engine (NDJSON in, NDJSON out)
    Run {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Engine configuration file (JSON); defaults when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Flush output after each record
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Score the difference between two feature summary JSON files
    Score {
        /// Baseline feature summary
        baseline: PathBuf,
        /// Candidate feature summary
        candidate: PathBuf,
    },

    /// Print the engine configuration as JSON
    Config {
        /// Pretty-print even when stdout is not a terminal
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Engine(#[from] VigilError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One output record per processed sensor reading.
#[derive(Serialize)]
struct RunRecord {
    gsr: i64,
    intensity_level: u32,
    stabilized: bool,
    force_trigger_pending: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Run {
            input,
            config,
            flush,
        } => cmd_run(&input, config.as_deref(), flush),
        Commands::Score {
            baseline,
            candidate,
        } => cmd_score(&baseline, &candidate),
        Commands::Config { pretty } => cmd_config(pretty),
    }
}

fn cmd_run(
    input: &PathBuf,
    config_path: Option<&std::path::Path>,
    flush: bool,
) -> Result<(), CliError> {
    let config = match config_path {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    let mut engine = TriggerEngine::with_config(config)?;
    let coordinator = engine.coordinator();

    let reader: Box<dyn BufRead> = if input.to_string_lossy() == "-" {
        Box::new(io::stdin().lock())
    } else {
        Box::new(io::BufReader::new(fs::File::open(input)?))
    };

    let mut stdout = io::stdout();

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let reading: vigil::SensorReading = serde_json::from_str(trimmed)?;
        let Some(gsr) = reading.gsr else {
            // Readings without gsr carry nothing for the engine.
            continue;
        };

        let update = engine.process_gsr(gsr);
        let record = RunRecord {
            gsr,
            intensity_level: update.intensity_level,
            stabilized: update.stabilized,
            force_trigger_pending: coordinator.force_trigger_pending(),
        };

        writeln!(stdout, "{}", serde_json::to_string(&record)?)?;
        if flush {
            stdout.flush()?;
        }
    }

    Ok(())
}

fn cmd_score(baseline: &PathBuf, candidate: &PathBuf) -> Result<(), CliError> {
    let baseline: FeatureSummary = serde_json::from_str(&fs::read_to_string(baseline)?)?;
    let candidate: FeatureSummary = serde_json::from_str(&fs::read_to_string(candidate)?)?;

    let scorer = DifferenceScorer::default();
    println!("{:.6}", scorer.score(&candidate, Some(&baseline)));
    Ok(())
}

fn cmd_config(pretty: bool) -> Result<(), CliError> {
    let config = EngineConfig::default();
    let json = if pretty || atty::is(atty::Stream::Stdout) {
        serde_json::to_string_pretty(&config)?
    } else {
        serde_json::to_string(&config)?
    };
    println!("{json}");
    Ok(())
}
