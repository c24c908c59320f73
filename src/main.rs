//! tracewire
//!
//! A small HTTP service that demonstrates per-request tracing, structured
//! logging and Prometheus metrics.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ trace_requests ──▶ track_metrics ──▶ catch panic ──▶ timeout ──▶ handler
//!                     (trace ID,         (request          (500)           (408)       (`/`, `/health`,
//!                      received log)      sample)                                       `/metrics`, 404)
//!     Client Response
//!     ◀────────────── X-Trace-ID header + completed log ◀────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```text
//! tracewire [--config service.toml] [--bind 0.0.0.0:8000]
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use tracewire::config::{load_config, ServiceConfig};
use tracewire::observability::logging;
use tracewire::{HttpMetrics, HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "tracewire", version, about = "HTTP service with request tracing and metrics")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.logging)?;

    tracing::info!("tracewire v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        metrics_enabled = config.metrics.enabled,
        "Configuration loaded"
    );

    let metrics = Arc::new(HttpMetrics::new(config.metrics.clone())?);
    metrics.initialize();

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config, metrics);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
