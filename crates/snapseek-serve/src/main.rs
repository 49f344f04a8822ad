//! snapseek-serve - HTTP search API for indexed photos.

use std::path::PathBuf;

use anyhow::Context;
use axum::http::Request;
use clap::Parser;
use snapseek_core::metrics::serve_metrics;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use snapseek_serve::{AppState, Config, router};

/// snapseek photo search server.
#[derive(Parser, Debug)]
#[command(name = "snapseek-serve")]
#[command(about = "HTTP API answering natural-language photo searches", long_about = None)]
struct Args {
    /// Path to .env file (optional).
    #[arg(long, env = "DOTENV_PATH", default_value = ".env")]
    dotenv: PathBuf,

    /// Metrics HTTP server port (0 to disable).
    #[arg(long, env = "SNAPSEEK_METRICS_PORT", default_value = "0")]
    metrics_port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.dotenv.exists() {
        dotenvy::from_path(&args.dotenv)
            .with_context(|| format!("failed to load {}", args.dotenv.display()))?;
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if args.metrics_port > 0 {
        serve_metrics(args.metrics_port).await?;
    }

    let config = Config::from_env().context("invalid configuration")?;
    let bind_addr = config.bind_addr.clone();

    let state = AppState::from_config(config)
        .await
        .context("failed to build application state")?;

    // The router sets the allow-origin header itself; this layer answers
    // preflight requests.
    let app = router(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::span!(
                    Level::INFO,
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    query = request.uri().query().unwrap_or("")
                )
            }),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "starting server");

    axum::serve(listener, app).await?;

    Ok(())
}
