//! Prometheus metrics for watcher runs.

use crate::error::{RateWatchError, Result};
use prometheus::{Encoder, Gauge, Histogram, HistogramOpts, IntCounter, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub checks_total: IntCounter,
    pub observations_total: IntCounter,
    pub fetch_failures_total: IntCounter,
    pub alerts_sent_total: IntCounter,
    pub check_duration_seconds: Histogram,
    pub last_success_timestamp_seconds: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let checks_total = IntCounter::new("ratewatch_checks_total", "Completed check runs")
            .map_err(metrics_err)?;
        let observations_total =
            IntCounter::new("ratewatch_observations_total", "Quotes appended to history")
                .map_err(metrics_err)?;
        let fetch_failures_total =
            IntCounter::new("ratewatch_fetch_failures_total", "Quote fetches that failed")
                .map_err(metrics_err)?;
        let alerts_sent_total =
            IntCounter::new("ratewatch_alerts_sent_total", "Digests delivered to the webhook")
                .map_err(metrics_err)?;
        let check_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("ratewatch_check_duration_seconds", "Duration of a check run")
                .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )
        .map_err(metrics_err)?;
        let last_success_timestamp_seconds = Gauge::with_opts(Opts::new(
            "ratewatch_last_success_timestamp_seconds",
            "Unix time of the last successful check run",
        ))
        .map_err(metrics_err)?;

        registry.register(Box::new(checks_total.clone())).map_err(metrics_err)?;
        registry.register(Box::new(observations_total.clone())).map_err(metrics_err)?;
        registry.register(Box::new(fetch_failures_total.clone())).map_err(metrics_err)?;
        registry.register(Box::new(alerts_sent_total.clone())).map_err(metrics_err)?;
        registry.register(Box::new(check_duration_seconds.clone())).map_err(metrics_err)?;
        registry
            .register(Box::new(last_success_timestamp_seconds.clone()))
            .map_err(metrics_err)?;

        Ok(Self {
            registry,
            checks_total,
            observations_total,
            fetch_failures_total,
            alerts_sent_total,
            check_duration_seconds,
            last_success_timestamp_seconds,
        })
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn export(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(metrics_err)?;
        String::from_utf8(buffer).map_err(metrics_err)
    }
}

fn metrics_err(e: impl std::fmt::Display) -> RateWatchError {
    RateWatchError::Metrics(e.to_string())
}
