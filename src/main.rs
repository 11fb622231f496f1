//! Demo server: an axum app behind the fail-safe tracing interceptor.
//!
//! ```text
//!   client ──▶ TracingInterceptorLayer ──▶ TimeoutLayer ──▶ handlers
//!                  │
//!                  └──▶ LogTracer ──▶ tracing subscriber (stdout)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use failsafe_tracing::config::{load_config, AppConfig};
use failsafe_tracing::filter::{Ownership, TracerHandle};
use failsafe_tracing::lifecycle::{signals, Shutdown};
use failsafe_tracing::observability::{logging, metrics};
use failsafe_tracing::tracer::{LogTracer, Tracer};
use failsafe_tracing::HttpServer;

#[derive(Parser)]
#[command(name = "failsafe-tracing")]
#[command(about = "HTTP server with fail-safe request tracing", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("failsafe-tracing v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        url_patterns = ?config.filter.url_patterns,
        shutdown_tracer = config.filter.shutdown_tracer,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let log_tracer = Arc::new(LogTracer::new(&config.tracer));
    let handle = TracerHandle::from_shutdown_flag(log_tracer.clone(), config.filter.shutdown_tracer);
    let shared = handle.ownership() == Ownership::Shared;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(&config, handle)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server_task = tokio::spawn(server.run(listener, server_shutdown));

    signals::wait_for_shutdown().await;
    shutdown.trigger();
    server_task.await??;

    // The interceptor leaves a shared tracer open; its owner is this process.
    if shared {
        log_tracer.close()?;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
