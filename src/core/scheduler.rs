//! Cron-based scheduler that runs a check on a fixed interval

use crate::core::http::HealthStatus;
use crate::core::orchestrator::Orchestrator;
use crate::error::{RateWatchError, Result};
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Convert an interval in seconds to a six-field cron expression
/// (second minute hour day month weekday).
///
/// Only intervals that divide their unit evenly map to a cron step with fixed
/// spacing: seconds dividing 60, whole minutes dividing 60, whole hours
/// dividing 24, or exactly one day. Anything else is rejected.
pub fn interval_to_cron(interval_seconds: u64) -> Result<String> {
    let unsupported = || {
        RateWatchError::Config(format!(
            "CHECK_INTERVAL_SECONDS={} has no evenly spaced cron schedule; \
             use a divisor of 60s, 60m or 24h, or 86400",
            interval_seconds
        ))
    };

    match interval_seconds {
        0 => Err(RateWatchError::Config(
            "scheduler disabled: interval_seconds is 0".into(),
        )),
        s if s < 60 => {
            if 60 % s != 0 {
                return Err(unsupported());
            }
            Ok(format!("*/{} * * * * *", s))
        }
        s if s < 3600 => {
            if s % 60 != 0 || 60 % (s / 60) != 0 {
                return Err(unsupported());
            }
            Ok(format!("0 */{} * * * *", s / 60))
        }
        s if s < 86_400 => {
            if s % 3600 != 0 || 24 % (s / 3600) != 0 {
                return Err(unsupported());
            }
            Ok(format!("0 0 */{} * * *", s / 3600))
        }
        86_400 => Ok("0 0 0 * * *".to_string()),
        _ => Err(unsupported()),
    }
}

/// Run one check and record the outcome in the shared health status.
pub async fn run_check(orchestrator: &Orchestrator, health: &RwLock<HealthStatus>) {
    let now = chrono::Utc::now();
    match orchestrator.run_once().await {
        Ok(summary) => {
            info!(
                pairs = summary.outcomes.len(),
                triggered = ?summary.triggered(),
                notified = summary.notified,
                "CheckScheduler: check complete"
            );
            health.write().await.record_success(now);
        }
        Err(e) => {
            error!(error = %e, "CheckScheduler: check failed");
            health.write().await.record_failure(now, e.to_string());
        }
    }
}

/// Periodically runs [`Orchestrator::run_once`]. Failures are logged and the
/// schedule keeps going.
pub struct CheckScheduler {
    orchestrator: Arc<Orchestrator>,
    health: Arc<RwLock<HealthStatus>>,
    schedule: Schedule,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl CheckScheduler {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        health: Arc<RwLock<HealthStatus>>,
        interval_seconds: u64,
    ) -> Result<Self> {
        let cron_expr = interval_to_cron(interval_seconds)?;
        let schedule = Schedule::from_str(&cron_expr).map_err(|e| {
            RateWatchError::Config(format!("Invalid cron expression '{}': {}", cron_expr, e))
        })?;

        info!(
            interval = interval_seconds,
            cron = %cron_expr,
            "CheckScheduler: created with interval {}s (cron: {})",
            interval_seconds,
            cron_expr
        );

        Ok(Self {
            orchestrator,
            health,
            schedule,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    pub async fn start(&self) {
        let orchestrator = self.orchestrator.clone();
        let health = self.health.clone();
        let schedule = self.schedule.clone();

        let handle = tokio::spawn(async move {
            info!("CheckScheduler: started, waiting for cron schedule...");

            loop {
                let mut upcoming = schedule.upcoming(chrono::Utc);
                if let Some(next_tick) = upcoming.next() {
                    let now = chrono::Utc::now();
                    if next_tick > now {
                        let duration = (next_tick - now).to_std().unwrap_or_default();
                        tokio::time::sleep(duration).await;
                    }
                } else {
                    tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                    continue;
                }

                run_check(&orchestrator, &health).await;
            }
        });

        *self.handle.write().await = Some(handle);
        info!("CheckScheduler: started successfully");
    }

    pub async fn stop(&self) {
        if let Some(h) = self.handle.write().await.take() {
            h.abort();
            info!("CheckScheduler: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }
}
