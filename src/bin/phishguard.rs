//! PhishGuard smoke-test CLI - classifies one URL or one .eml file.
//!
//! Usage:
//!   phishguard url https://example.com/login
//!   phishguard email suspicious.eml
//!   phishguard --models /opt/phishguard/models url http://phish.example
//!
//! Prints the scan record as JSON. Exits 2 when artifacts are missing or
//! malformed, 1 when the input itself is invalid.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use phishguard_core::constants::{default_model_dir, APP_NAME, APP_VERSION};
use phishguard_core::record::{InputKind, ScanRecord};
use phishguard_core::{EmailPipeline, PipelineError, PipelineResult, UrlPipeline};

#[derive(Parser)]
#[command(name = "phishguard")]
#[command(about = "Phishing detection smoke tests")]
struct Cli {
    /// Directory holding the model artifacts
    /// (defaults to $PHISHGUARD_MODEL_DIR, then ./models)
    #[arg(short, long)]
    models: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a URL
    Url {
        #[arg(default_value = "https://example.com")]
        url: String,
    },
    /// Classify a raw .eml file
    Email {
        /// Path to the .eml file
        file: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let models = cli
        .models
        .unwrap_or_else(|| PathBuf::from(default_model_dir()));

    log::info!("{} v{} (artifacts: {})", APP_NAME, APP_VERSION, models.display());

    match run(&models, cli.command) {
        Ok(record) => match serde_json::to_string_pretty(&record) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                log::error!("Failed to encode record: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(if e.is_fatal() { 2 } else { 1 });
        }
    }
}

fn run(models: &std::path::Path, command: Command) -> PipelineResult<ScanRecord> {
    match command {
        Command::Url { url } => {
            let pipeline = UrlPipeline::load(models)?;
            let started = Instant::now();
            let prediction = pipeline.predict(&url)?;
            Ok(ScanRecord::new(
                InputKind::Url,
                prediction,
                started.elapsed().as_millis() as u64,
            ))
        }
        Command::Email { file } => {
            let raw = fs::read(&file).map_err(|e| {
                PipelineError::InvalidInput(format!("cannot read {}: {}", file.display(), e))
            })?;
            let pipeline = EmailPipeline::load(models)?;
            let started = Instant::now();
            let prediction = pipeline.predict(&raw)?;
            Ok(ScanRecord::new(
                InputKind::Email,
                prediction,
                started.elapsed().as_millis() as u64,
            ))
        }
    }
}
