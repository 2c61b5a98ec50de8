#![forbid(unsafe_code)]

//! hsr — Hansard Speaker Resolver.
//!
//! CLI entry point: parses arguments, loads the reference tables, runs the
//! resolution pipeline, prints the ratio statistics.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hsr::error::HsrError;
use hsr::loader::{DataPaths, load_reference_data};
use hsr::pipeline::{self, PipelineOptions};
use hsr::sink::{RunStats, completion_payload};

/// Resolve free-text speaker attributions in the Hansard corpus to stable
/// member ids.
#[derive(Parser, Debug)]
#[command(name = "hsr", version, about, long_about = None)]
struct Cli {
    /// Number of cores to use (one is reserved for the result sink).
    #[arg(long, default_value_t = 2)]
    cores: usize,

    /// Rows per chunk.
    #[arg(long, default_value_t = 1_000_000)]
    chunk_size: usize,

    /// Input/output directory root.
    #[arg(long, env = "SCRATCH", default_value = "data")]
    scratch: PathBuf,

    /// Source CSV; defaults to `<scratch>/speeches.csv`.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Annotated output CSV; defaults to `<scratch>/output.csv`.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Show per-table loading progress.
    #[arg(long)]
    verbose: bool,

    /// Show everything including per-stage cascade detail.
    #[arg(long)]
    trace: bool,
}

/// Priority: `--trace` > `--verbose` > `RUST_LOG` env var > default (warn).
fn init_tracing(cli: &Cli) {
    let filter = if cli.trace {
        EnvFilter::new("hsr=trace")
    } else if cli.verbose {
        EnvFilter::new("hsr=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    if cli.cores < 1 || cli.cores > available {
        let err = HsrError::InvalidArgument {
            detail: format!(
                "--cores must be between 1 and {available} (got {})",
                cli.cores
            ),
        };
        eprintln!("error: {err}");
        return ExitCode::from(2);
    }
    if cli.chunk_size == 0 {
        let err = HsrError::InvalidArgument {
            detail: "--chunk-size must be positive".to_string(),
        };
        eprintln!("error: {err}");
        return ExitCode::from(2);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let started = Instant::now();
    let today = chrono::Local::now().date_naive();

    let paths = DataPaths::new(&cli.scratch);
    let input = cli
        .input
        .clone()
        .unwrap_or_else(|| cli.scratch.join("speeches.csv"));
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.scratch.join("output.csv"));

    info!(root = %cli.scratch.display(), "loading reference tables");
    let data = load_reference_data(&paths, today)?;
    info!(
        members = data.members.len(),
        aliases = data.alias_map.len(),
        "reference data ready"
    );

    let opts = PipelineOptions {
        cores: cli.cores,
        chunk_size: cli.chunk_size,
    };
    let stats = pipeline::run(&data, &input, &output, &opts)?;
    let duration = started.elapsed().as_secs_f64();

    print_summary(&stats, duration);

    if let Ok(secret) = std::env::var("WEBHOOK_SECRET") {
        if !secret.is_empty() {
            // Building the payload is ours; delivering it belongs to the
            // notification hook.
            let payload = completion_payload(&stats, duration);
            info!(payload = %payload, "completion notification payload ready");
        }
    }

    Ok(())
}

fn print_summary(stats: &RunStats, duration: f64) {
    println!(
        "{} hits ({:.2}%)",
        stats.hits,
        stats.hit_ratio() * 100.0
    );
    println!(
        "{} ambiguities ({:.2}%)",
        stats.ambiguous,
        stats.ambiguous_ratio() * 100.0
    );
    println!(
        "{} misses ({:.2}%)",
        stats.missed,
        stats.missed_ratio() * 100.0
    );
    println!("{} rows ignored", stats.ignored);
    println!(
        "Total rows processed: {} in {:.2}s",
        stats.total() + stats.ignored,
        duration
    );
}
