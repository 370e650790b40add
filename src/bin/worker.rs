//! Ratewatch Worker
//!
//! Long-running process that checks every configured pair on a fixed interval
//! and serves `/health` and `/metrics`.

use dotenvy::dotenv;
use ratewatch::config::Config;
use ratewatch::core::http::{start_server, AppState, HealthStatus};
use ratewatch::core::orchestrator::Orchestrator;
use ratewatch::core::scheduler::{run_check, CheckScheduler};
use ratewatch::logging;
use ratewatch::metrics::Metrics;
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = Config::from_env()?;
    info!("Starting Ratewatch Worker");
    info!(environment = %config.environment, "Environment");

    if config.check_interval_seconds == 0 {
        return Err("CHECK_INTERVAL_SECONDS must be > 0 for worker".into());
    }

    let metrics = Arc::new(Metrics::new()?);
    let orchestrator = Orchestrator::from_config(&config)?.with_metrics(metrics.clone());
    if !orchestrator.has_sink() {
        warn!("DISCORD_WEBHOOK_URL not configured; checks will only update history");
    }
    let orchestrator = Arc::new(orchestrator);
    let health = Arc::new(RwLock::new(HealthStatus::default()));
    let scheduler = CheckScheduler::new(
        orchestrator.clone(),
        health.clone(),
        config.check_interval_seconds,
    )?;

    info!(
        pairs = ?config.pairs.iter().map(|p| p.code()).collect::<Vec<_>>(),
        interval = config.check_interval_seconds,
        "Checking {} pair(s) every {} seconds",
        config.pairs.len(),
        config.check_interval_seconds
    );

    let state = AppState {
        health: health.clone(),
        metrics: metrics.clone(),
        start_time: Arc::new(Instant::now()),
    };

    let port = config.worker_port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port, state).await {
            error!(error = %e, "Worker HTTP server failed");
        }
    });

    // First check runs immediately rather than waiting for the first tick.
    run_check(&orchestrator, &health).await;

    scheduler.start().await;

    info!("Worker started, waiting for shutdown signal...");
    signal::ctrl_c().await?;

    info!("Shutting down worker...");
    scheduler.stop().await;
    server_handle.abort();
    info!("Worker stopped");

    Ok(())
}
