//! LifeStream service binary.
//!
//! Loads configuration, wires the application context, and runs the
//! dispatcher loop and the HTTP server until shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use lifestream_infrastructure::bootstrap::AppContext;
use lifestream_infrastructure::config::ConfigLoader;
use lifestream_infrastructure::logging::init_logging;
use lifestream_server::{AppState, build_router};

/// LifeStream: turn uploaded footage into a searchable daily memory.
#[derive(Debug, Parser)]
#[command(name = "lifestream", version, about)]
struct Args {
    /// Explicit configuration file (default: config/{LIFESTREAM_ENV}.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }
    let mut config = loader.load().context("failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let context = AppContext::build(config)
        .await
        .context("failed to build application context")?;

    let cancel = CancellationToken::new();
    let dispatcher = context.dispatcher.clone();
    let dispatcher_cancel = cancel.clone();
    let dispatcher_handle = tokio::spawn(async move {
        dispatcher.run(dispatcher_cancel).await;
    });

    let state = Arc::new(AppState {
        upload: context.upload_service,
        search: context.search_service,
        provider_names: context.provider_names,
    });
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "HTTP server listening");

    let shutdown = cancel.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
            shutdown.cancel();
        })
        .await
        .context("HTTP server failed")?;

    cancel.cancel();
    let _ = dispatcher_handle.await;
    info!("Shutdown complete");
    Ok(())
}
