//! snapseek ingestion runner.
//!
//! Processes one storage event notification: resolves labels for every
//! record, builds photo documents, and upserts them into the index.
//!
//! # Usage
//!
//! ```bash
//! # Event from a file
//! snapseek-ingest --event ./event.json
//!
//! # Event piped from the invoking system
//! cat event.json | snapseek-ingest
//! ```
//!
//! Record failures are logged and reported but never fail the process; the
//! exit code is non-zero only when the event itself cannot be read or the
//! pipeline cannot be configured.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use snapseek_core::metrics::serve_metrics;
use snapseek_core::{IndexClient, IndexConfig, SigV4Signer, aws_sdk_config};
use snapseek_ingest::{DetectorConfig, DetectorSource, Ingestor, LabelSource, MetadataSource};
use tracing_subscriber::EnvFilter;

/// Index uploaded photos from a storage event.
#[derive(Parser, Debug)]
#[command(name = "snapseek-ingest")]
#[command(about = "Index uploaded photos from a storage event notification")]
#[command(version)]
struct Args {
    /// Path to the event JSON (reads stdin when omitted)
    #[arg(long, short)]
    event: Option<PathBuf>,

    /// Path to .env file (optional)
    #[arg(long, env = "DOTENV_PATH", default_value = ".env")]
    dotenv: PathBuf,

    /// Metadata entry holding comma-separated custom labels
    #[arg(long, default_value = snapseek_ingest::CUSTOM_LABELS_FIELD)]
    metadata_field: String,

    /// Maximum labels requested from the detector
    #[arg(long, default_value = "10")]
    max_labels: i32,

    /// Minimum detector confidence (percent)
    #[arg(long, default_value = "75")]
    min_confidence: f32,

    /// Metrics HTTP server port (0 to disable)
    #[arg(long, env = "SNAPSEEK_METRICS_PORT", default_value = "0")]
    metrics_port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.dotenv.exists() {
        dotenvy::from_path(&args.dotenv)
            .with_context(|| format!("failed to load {}", args.dotenv.display()))?;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    if args.metrics_port > 0 {
        serve_metrics(args.metrics_port)
            .await
            .context("failed to start metrics exporter")?;
    }

    let raw = match &args.event {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read event from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read event from stdin")?;
            buf
        }
    };

    let config = IndexConfig::from_env()?;
    let sdk = aws_sdk_config(&config).await;
    let signer = SigV4Signer::from_sdk_config(&sdk, &config)?;
    let index = IndexClient::new(&config.endpoint, signer, config.timeout)?;

    let detector = DetectorSource::new(
        aws_sdk_rekognition::Client::new(&sdk),
        DetectorConfig {
            max_labels: args.max_labels,
            min_confidence: args.min_confidence,
        },
    );
    let metadata =
        MetadataSource::with_field(aws_sdk_s3::Client::new(&sdk), args.metadata_field.clone());
    let sources: Vec<Box<dyn LabelSource>> = vec![Box::new(detector), Box::new(metadata)];

    let ingestor = Ingestor::new(sources, index, config.index.clone());
    let report = ingestor.handle_event_json(&raw).await?;

    println!(
        "{}",
        json!({
            "message": "OK",
            "indexed": report.indexed,
            "failed": report.failed.len(),
        })
    );

    Ok(())
}
