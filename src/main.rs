//! One-shot check: fetch each configured pair once, update history, alert if
//! any rule fires. Suited to cron jobs and CI schedules.

use dotenvy::dotenv;
use ratewatch::config::Config;
use ratewatch::core::Orchestrator;
use ratewatch::logging;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = Config::from_env()?;
    info!(
        environment = %config.environment,
        pairs = ?config.pairs.iter().map(|p| p.code()).collect::<Vec<_>>(),
        history_dir = %config.history_dir.display(),
        "Starting ratewatch check"
    );

    let orchestrator = Orchestrator::from_config(&config)?;
    if !orchestrator.has_sink() {
        warn!("DISCORD_WEBHOOK_URL not configured; history will be updated without notification");
    }

    let summary = orchestrator.run_once().await?;

    for outcome in &summary.outcomes {
        let status = if outcome.recorded { "saved" } else { "skipped" };
        println!(
            "OK - {} quote {}: {} at {}",
            status,
            outcome.observation.pair,
            outcome.observation.bid,
            outcome.observation.timestamp_iso
        );
    }

    Ok(())
}
