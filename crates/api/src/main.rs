//! PrepPulse - meeting prep notification service.
//!
//! Service entry point: loads configuration, wires the application
//! context, starts the periodic scan scheduler, and serves the HTTP
//! surface until ctrl-c.

mod context;
mod routes;

use std::sync::Arc;

use anyhow::Context as _;
use preppulse_infra::{ScanScheduler, ScanSchedulerConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::context::AppContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => warn!(error = %e, "no .env file loaded"),
    }

    let config = preppulse_infra::config::load().context("failed to load configuration")?;
    let bind_addr = config.server.bind_addr.clone();
    let scheduler_config = ScanSchedulerConfig {
        cron_expression: config.scan.cron_expression.clone(),
        ..Default::default()
    };

    let ctx = Arc::new(AppContext::new(config).context("failed to initialise application")?);
    info!(db_path = %ctx.config.database.path, "application context initialised");

    let mut scheduler = ScanScheduler::with_config(scheduler_config, ctx.coordinator.clone());
    scheduler.start().await.context("failed to start scan scheduler")?;

    let app = routes::router(ctx);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    scheduler.stop().await.context("failed to stop scan scheduler")?;
    info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
