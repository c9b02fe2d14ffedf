use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fit2tcx::conversion::convert_fit_bytes;

/// Convert a FIT activity file into a TCX document written to standard
/// output.
#[derive(Parser)]
#[command(name = "fit2tcx", version)]
struct Cli {
    /// Path to the FIT activity file to convert.
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

fn main() -> ExitCode {
    // Logging goes to stderr; stdout carries nothing but the document.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fit2tcx=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let bytes = match fs::read(&cli.file) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("Failed to read {}: {err}", cli.file.display());
            return ExitCode::FAILURE;
        }
    };

    match convert_fit_bytes(&bytes) {
        Ok(converted) => {
            tracing::debug!(
                sport = converted.document.activity.sport,
                laps = converted.document.activity.laps.len(),
                "conversion finished"
            );
            print!("{}", converted.xml);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
