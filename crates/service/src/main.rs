//! Pod Info Service
//!
//! Runs as one replica of a Kubernetes deployment, reporting its identity
//! and exposing host resource metrics for Prometheus to scrape.

use anyhow::Result;
use service_lib::{api, AppState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting pod-info-service");

    // Resolve configuration once; it is never re-read per request
    let config = config::ServiceConfig::load()?;
    let identity = config.identity();
    info!(pod_name = %identity.pod_name, "Service configured");

    let app_state = if config.metrics_enabled {
        AppState::new(identity)?
    } else {
        AppState::without_metrics(identity)
    };
    let app_state = Arc::new(app_state);

    let addr = config.listen_addr();
    let logger = app_state.logger.clone();
    logger.log_startup(
        &config.app_title,
        &config.app_version,
        &addr,
        config.metrics_enabled,
    );

    api::serve(&addr, app_state, shutdown_signal()).await?;

    logger.log_shutdown("signal received");
    info!("Shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Signal received, starting graceful shutdown");
}
