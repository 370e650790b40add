//! Per-run pipeline: load history, fetch, append, save, evaluate, notify.

use crate::config::Config;
use crate::error::Result;
use crate::history::{History, HistoryStore, JsonFileHistoryStore};
use crate::metrics::Metrics;
use crate::models::alert::{AlertThresholds, Decision};
use crate::models::observation::{Observation, Pair};
use crate::notify::{compose_block, compose_digest, AlertSink, DiscordWebhook};
use crate::rules::engine::ALWAYS_NOTIFY_REASON;
use crate::rules::RuleEngine;
use crate::services::{AwesomeApiClient, QuoteProvider, RetryPolicy};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A pair to check together with the thresholds that apply to it.
#[derive(Debug, Clone)]
pub struct PairTarget {
    pub pair: Pair,
    pub thresholds: AlertThresholds,
}

/// Result of checking one pair.
#[derive(Debug, Clone)]
pub struct PairOutcome {
    pub observation: Observation,
    pub previous_bid: Option<f64>,
    pub decision: Decision,
    /// False when the quote was older than the last stored one and was dropped.
    pub recorded: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub outcomes: Vec<PairOutcome>,
    pub notified: bool,
}

impl RunSummary {
    /// Pair codes whose decision asked for a notification, in processing order.
    pub fn triggered(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.decision.notify)
            .map(|o| o.observation.pair.as_str())
            .collect()
    }
}

pub struct Orchestrator {
    targets: Vec<PairTarget>,
    quotes: Arc<dyn QuoteProvider>,
    history: Arc<dyn HistoryStore>,
    sink: Option<Arc<dyn AlertSink>>,
    metrics: Option<Arc<Metrics>>,
}

impl Orchestrator {
    pub fn new(
        targets: Vec<PairTarget>,
        quotes: Arc<dyn QuoteProvider>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            targets,
            quotes,
            history,
            sink: None,
            metrics: None,
        }
    }

    /// Wire the production adapters described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let targets = config
            .pairs
            .iter()
            .map(|pair| PairTarget {
                pair: pair.clone(),
                thresholds: config.thresholds_for(pair),
            })
            .collect();

        let quotes = AwesomeApiClient::new(config.quote_api_url.clone(), config.http_timeout)?
            .with_retry(RetryPolicy {
                max_times: config.fetch_retries,
                ..RetryPolicy::default()
            });
        let history = JsonFileHistoryStore::new(config.history_dir.clone());

        let mut orchestrator = Self::new(targets, Arc::new(quotes), Arc::new(history));
        if let Some(url) = &config.webhook_url {
            let webhook = DiscordWebhook::new(url.clone(), config.http_timeout)?;
            orchestrator = orchestrator.with_sink(Arc::new(webhook));
        }
        Ok(orchestrator)
    }

    pub fn with_sink(mut self, sink: Arc<dyn AlertSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn targets(&self) -> &[PairTarget] {
        &self.targets
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Check every pair in order, then send one digest if any pair triggered.
    ///
    /// The first failing pair aborts the run; pairs processed before it keep
    /// their saved history.
    pub async fn run_once(&self) -> Result<RunSummary> {
        let start = Instant::now();
        let mut summary = RunSummary::default();
        let mut blocks = Vec::new();

        for target in &self.targets {
            let outcome = self.check_pair(target).await?;
            if outcome.decision.notify {
                blocks.push(compose_block(
                    &outcome.observation,
                    outcome.previous_bid,
                    &outcome.decision.reasons,
                ));
            }
            summary.outcomes.push(outcome);
        }

        if blocks.is_empty() {
            info!("No alert trigger, history updated");
        } else if let Some(sink) = &self.sink {
            let message = compose_digest(&blocks);
            sink.send(&message).await?;
            summary.notified = true;
            if let Some(metrics) = &self.metrics {
                metrics.alerts_sent_total.inc();
            }
            info!(
                triggered = ?summary.triggered(),
                "Alert sent for {} pair(s)",
                blocks.len()
            );
        } else {
            info!(
                triggered = ?summary.triggered(),
                "Webhook not configured, history updated without notification"
            );
        }

        if let Some(metrics) = &self.metrics {
            metrics.checks_total.inc();
            metrics
                .check_duration_seconds
                .observe(start.elapsed().as_secs_f64());
            metrics
                .last_success_timestamp_seconds
                .set(Utc::now().timestamp() as f64);
        }

        Ok(summary)
    }

    async fn check_pair(&self, target: &PairTarget) -> Result<PairOutcome> {
        let pair = &target.pair;

        let history = self.history.load(pair).await?;
        let previous_bid = history.last_bid();

        let observation = match self.quotes.fetch_quote(pair).await {
            Ok(observation) => observation,
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    metrics.fetch_failures_total.inc();
                }
                return Err(e);
            }
        };

        if is_out_of_order(&history, &observation) {
            warn!(
                pair = %pair,
                timestamp = %observation.timestamp_iso,
                "Quote for {} is older than the last stored observation, skipping",
                pair
            );
            // Change rules are skipped for a stale bid; forced mode still reports.
            let reasons = if target.thresholds.always_notify {
                vec![ALWAYS_NOTIFY_REASON.to_string()]
            } else {
                Vec::new()
            };
            return Ok(PairOutcome {
                observation,
                previous_bid,
                decision: Decision::from_reasons(reasons),
                recorded: false,
            });
        }

        let updated = history.append(observation.clone());
        self.history.save(pair, &updated).await?;
        if let Some(metrics) = &self.metrics {
            metrics.observations_total.inc();
        }

        let decision = RuleEngine::evaluate(observation.bid, previous_bid, &target.thresholds);

        debug!(
            pair = %pair,
            bid = observation.bid,
            previous_bid = ?previous_bid,
            notify = decision.notify,
            reasons = ?decision.reasons,
            "Evaluated {}",
            pair
        );

        Ok(PairOutcome {
            observation,
            previous_bid,
            decision,
            recorded: true,
        })
    }
}

/// True when both timestamps parse and the new one is strictly earlier.
fn is_out_of_order(history: &History, observation: &Observation) -> bool {
    let parse = |ts: &str| DateTime::parse_from_rfc3339(ts).ok();
    let last = history.last().and_then(|last| parse(&last.timestamp_iso));
    match (last, parse(&observation.timestamp_iso)) {
        (Some(last), Some(new)) => new < last,
        _ => false,
    }
}
