//! sonomap-panel - embedding explorer analysis panel service
//!
//! Serves the selection-to-analysis coordination core over HTTP and SSE.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sonomap_common::config::{resolve_config, ConfigOverrides, PanelSettings};
use sonomap_panel::{build_router, AppState, Panel};
use tokio::signal;
use tracing::{info, warn};

/// Command-line arguments for sonomap-panel
#[derive(Parser, Debug)]
#[command(name = "sonomap-panel")]
#[command(about = "Analysis panel for audio embedding exploration")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Base URL of the analysis backend
    #[arg(short, long)]
    backend_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = resolve_config(&ConfigOverrides {
        config_path: args.config,
        port: args.port,
        backend_url: args.backend_url,
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .init();

    info!(
        "Starting sonomap-panel v{} (backend {})",
        env!("CARGO_PKG_VERSION"),
        config.backend_url
    );

    let settings = PanelSettings::from(&config);
    let panel = Arc::new(
        Panel::with_http(&settings).context("Failed to create analysis backend client")?,
    );

    let app = build_router(AppState::new(Arc::clone(&panel)));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("sonomap-panel listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    panel.shutdown();
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
