use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueHint};
use tcx_hr_merge::config::Config;
use tcx_hr_merge::error::{AppError, SerializationError};
use tcx_hr_merge::pipeline::{self, read, write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Adds the heart rate recorded by one device to a TCX activity recorded by
/// another and prints the merged activity.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TCX file that should be enriched with heart-rate data
    #[arg(long = "master-tcx", value_hint = ValueHint::FilePath)]
    master_tcx: PathBuf,

    /// TCX file that contains the heart-rate samples
    #[arg(long = "bpm-tcx", value_hint = ValueHint::FilePath)]
    bpm_tcx: PathBuf,
}

fn main() -> ExitCode {
    // stdout carries the document, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tcx_hr_merge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &Config) -> Result<(), AppError> {
    let master = read::load(&cli.master_tcx, config)?;
    let heart_rate = read::load(&cli.bpm_tcx, config)?;

    let merged = pipeline::merge_documents(&master, &heart_rate)?;
    tracing::info!(
        "Merged {} master and {} heart-rate trackpoints into {} across {} laps",
        master.activity.trackpoint_count(),
        heart_rate.activity.trackpoint_count(),
        merged.activity.trackpoint_count(),
        merged.activity.laps.len()
    );

    let output = write::write(&merged)?;
    print_document(&output).map_err(SerializationError::from)?;
    Ok(())
}

fn print_document(output: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.write_all(b"\n")?;
    stdout.flush()
}
