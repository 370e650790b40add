//! Integration tests for full check runs.

use crate::test_utils::{
    mock_awesomeapi_quote, mock_webhook, observation, RecordingSink, StaticQuoteProvider,
};
use ratewatch::config::Config;
use ratewatch::core::orchestrator::{Orchestrator, PairTarget};
use ratewatch::history::{History, HistoryStore, InMemoryHistoryStore, JsonFileHistoryStore};
use ratewatch::metrics::Metrics;
use ratewatch::models::alert::AlertThresholds;
use ratewatch::models::observation::Pair;
use ratewatch::notify::composer::{DIGEST_FOOTER, DIGEST_HEADER};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::tempdir;
use wiremock::MockServer;

fn target(pair: Pair, thresholds: AlertThresholds) -> PairTarget {
    PairTarget { pair, thresholds }
}

fn usd() -> Pair {
    Pair::new("USD", "BRL")
}

fn eur() -> Pair {
    Pair::new("EUR", "BRL")
}

#[tokio::test]
async fn first_run_without_rules_only_records_history() {
    let store = Arc::new(InMemoryHistoryStore::new());
    let sink = Arc::new(RecordingSink::new());
    let quotes = StaticQuoteProvider::new().with_quote("USDBRL", 5.07, "2024-01-02T00:00:00Z");

    let orchestrator = Orchestrator::new(
        vec![target(usd(), AlertThresholds::default())],
        Arc::new(quotes),
        store.clone(),
    )
    .with_sink(sink.clone());

    let summary = orchestrator.run_once().await.expect("run succeeds");

    assert!(!summary.notified);
    assert!(summary.triggered().is_empty());
    assert_eq!(summary.outcomes[0].previous_bid, None);
    assert!(sink.messages().await.is_empty());
    assert_eq!(store.load(&usd()).await.unwrap().last_bid(), Some(5.07));
}

#[tokio::test]
async fn previous_bid_is_read_before_append() {
    let seeded = History::new().append(observation("USDBRL", 5.20, "2024-01-01T00:00:00Z"));
    let store = Arc::new(InMemoryHistoryStore::with_history(&usd(), seeded));
    let sink = Arc::new(RecordingSink::new());
    let quotes = StaticQuoteProvider::new().with_quote("USDBRL", 5.05, "2024-01-02T00:00:00Z");

    let orchestrator = Orchestrator::new(
        vec![target(usd(), AlertThresholds::new().with_drop_pct(1.0))],
        Arc::new(quotes),
        store.clone(),
    )
    .with_sink(sink.clone());

    let summary = orchestrator.run_once().await.expect("run succeeds");
    let outcome = &summary.outcomes[0];

    assert_eq!(outcome.previous_bid, Some(5.20));
    assert!(outcome.decision.notify);
    assert_eq!(outcome.decision.reasons, vec!["drop -2.88% <= -1.00%".to_string()]);
    assert_eq!(store.load(&usd()).await.unwrap().len(), 2);

    let messages = sink.messages().await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with(DIGEST_HEADER));
    assert!(messages[0].contains("**⬇️ -2.88%**"));
    assert!(messages[0].ends_with(DIGEST_FOOTER));
}

#[tokio::test]
async fn triggered_pairs_share_one_digest_in_order() {
    let store = Arc::new(InMemoryHistoryStore::new());
    let sink = Arc::new(RecordingSink::new());
    let quotes = StaticQuoteProvider::new()
        .with_quote("USDBRL", 5.05, "2024-01-02T00:00:00Z")
        .with_quote("EURBRL", 5.40, "2024-01-02T00:00:00Z");
    let thresholds = AlertThresholds::new().with_always_notify(true);

    let orchestrator = Orchestrator::new(
        vec![target(usd(), thresholds.clone()), target(eur(), thresholds)],
        Arc::new(quotes),
        store,
    )
    .with_sink(sink.clone());

    let summary = orchestrator.run_once().await.expect("run succeeds");
    assert!(summary.notified);
    assert_eq!(summary.triggered(), vec!["USDBRL", "EURBRL"]);

    let messages = sink.messages().await;
    assert_eq!(messages.len(), 1);
    let usd_at = messages[0].find("🇺🇸 USD/BRL").expect("usd block");
    let eur_at = messages[0].find("🇪🇺 EUR/BRL").expect("eur block");
    assert!(usd_at < eur_at);
}

#[tokio::test]
async fn only_triggered_pairs_appear_in_digest() {
    let store = Arc::new(InMemoryHistoryStore::new());
    let sink = Arc::new(RecordingSink::new());
    let quotes = StaticQuoteProvider::new()
        .with_quote("USDBRL", 5.05, "2024-01-02T00:00:00Z")
        .with_quote("EURBRL", 5.40, "2024-01-02T00:00:00Z");

    let orchestrator = Orchestrator::new(
        vec![
            target(usd(), AlertThresholds::default()),
            target(eur(), AlertThresholds::new().with_buy_below(5.50)),
        ],
        Arc::new(quotes),
        store,
    )
    .with_sink(sink.clone());

    let summary = orchestrator.run_once().await.expect("run succeeds");
    assert_eq!(summary.triggered(), vec!["EURBRL"]);

    let messages = sink.messages().await;
    assert!(!messages[0].contains("USD/BRL"));
    assert!(messages[0].contains("below buy target (<= 5.5000)"));
}

#[tokio::test]
async fn missing_sink_still_updates_history() {
    let store = Arc::new(InMemoryHistoryStore::new());
    let quotes = StaticQuoteProvider::new().with_quote("USDBRL", 5.05, "2024-01-02T00:00:00Z");

    let orchestrator = Orchestrator::new(
        vec![target(usd(), AlertThresholds::new().with_always_notify(true))],
        Arc::new(quotes),
        store.clone(),
    );

    let summary = orchestrator.run_once().await.expect("run succeeds");
    assert!(!summary.notified);
    assert_eq!(summary.triggered(), vec!["USDBRL"]);
    assert_eq!(store.load(&usd()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn fetch_failure_aborts_and_keeps_history() {
    let seeded = History::new().append(observation("USDBRL", 5.20, "2024-01-01T00:00:00Z"));
    let store = Arc::new(InMemoryHistoryStore::with_history(&usd(), seeded.clone()));
    let metrics = Arc::new(Metrics::new().expect("metrics initialization"));

    let orchestrator = Orchestrator::new(
        vec![target(usd(), AlertThresholds::default())],
        Arc::new(StaticQuoteProvider::new()),
        store.clone(),
    )
    .with_metrics(metrics.clone());

    assert!(orchestrator.run_once().await.is_err());
    assert_eq!(store.load(&usd()).await.unwrap(), seeded);
    assert_eq!(metrics.fetch_failures_total.get(), 1);
    assert_eq!(metrics.checks_total.get(), 0);
}

#[tokio::test]
async fn stale_quote_is_not_recorded() {
    let seeded = History::new().append(observation("USDBRL", 5.20, "2024-01-05T00:00:00Z"));
    let store = Arc::new(InMemoryHistoryStore::with_history(&usd(), seeded.clone()));
    let sink = Arc::new(RecordingSink::new());
    let quotes = StaticQuoteProvider::new().with_quote("USDBRL", 4.00, "2024-01-01T00:00:00Z");

    let orchestrator = Orchestrator::new(
        vec![target(usd(), AlertThresholds::new().with_buy_below(5.0))],
        Arc::new(quotes),
        store.clone(),
    )
    .with_sink(sink.clone());

    let summary = orchestrator.run_once().await.expect("run succeeds");
    assert!(!summary.outcomes[0].recorded);
    assert!(!summary.outcomes[0].decision.notify);
    assert_eq!(store.load(&usd()).await.unwrap(), seeded);
    assert!(sink.messages().await.is_empty());
}

#[tokio::test]
async fn stale_quote_still_reports_in_always_notify_mode() {
    let seeded = History::new().append(observation("USDBRL", 5.20, "2024-01-05T00:00:00Z"));
    let store = Arc::new(InMemoryHistoryStore::with_history(&usd(), seeded.clone()));
    let sink = Arc::new(RecordingSink::new());
    let quotes = StaticQuoteProvider::new().with_quote("USDBRL", 4.00, "2024-01-01T00:00:00Z");

    let orchestrator = Orchestrator::new(
        vec![target(
            usd(),
            AlertThresholds::new()
                .with_buy_below(5.0)
                .with_always_notify(true),
        )],
        Arc::new(quotes),
        store.clone(),
    )
    .with_sink(sink.clone());

    let summary = orchestrator.run_once().await.expect("run succeeds");
    let outcome = &summary.outcomes[0];
    assert!(!outcome.recorded);
    assert_eq!(outcome.decision.reasons, vec!["always_notify=true".to_string()]);
    assert!(summary.notified);
    assert_eq!(store.load(&usd()).await.unwrap(), seeded);

    let messages = sink.messages().await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("- always_notify=true"));
    assert!(!messages[0].contains("below buy target"));
}

#[tokio::test]
async fn metrics_track_successful_runs() {
    let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
    let quotes = StaticQuoteProvider::new().with_quote("USDBRL", 5.05, "2024-01-02T00:00:00Z");

    let orchestrator = Orchestrator::new(
        vec![target(usd(), AlertThresholds::new().with_always_notify(true))],
        Arc::new(quotes),
        Arc::new(InMemoryHistoryStore::new()),
    )
    .with_sink(Arc::new(RecordingSink::new()))
    .with_metrics(metrics.clone());

    orchestrator.run_once().await.expect("run succeeds");

    assert_eq!(metrics.checks_total.get(), 1);
    assert_eq!(metrics.observations_total.get(), 1);
    assert_eq!(metrics.alerts_sent_total.get(), 1);
    assert!(metrics.export().unwrap().contains("ratewatch_checks_total 1"));
}

#[tokio::test]
async fn configured_run_uses_http_adapters_and_json_store() {
    let api = MockServer::start().await;
    mock_awesomeapi_quote(&api, "USD", "BRL", "5.0500").await;
    mock_webhook(&api).await;
    let dir = tempdir().unwrap();

    let vars: HashMap<&str, String> = HashMap::from([
        ("QUOTE_API_URL", api.uri()),
        ("DISCORD_WEBHOOK_URL", format!("{}/webhook", api.uri())),
        ("HISTORY_DIR", dir.path().display().to_string()),
        ("BUY_BELOW_USDBRL", "5,10".to_string()),
        ("FETCH_RETRIES", "0".to_string()),
    ]);
    let config = Config::from_lookup(|key| vars.get(key).cloned()).expect("valid config");

    let orchestrator = Orchestrator::from_config(&config).expect("adapters build");
    let summary = orchestrator.run_once().await.expect("run succeeds");

    assert!(summary.notified);
    assert_eq!(
        summary.outcomes[0].decision.reasons,
        vec!["below buy target (<= 5.1000)".to_string()]
    );

    let stored = JsonFileHistoryStore::new(dir.path()).load(&usd()).await.unwrap();
    assert_eq!(stored.last_bid(), Some(5.05));
    assert_eq!(stored.last().unwrap().timestamp_iso, "2023-11-14T22:13:20Z");

    let requests = api.received_requests().await.expect("wiremock requests");
    let webhook_body = requests
        .iter()
        .find(|r| r.url.path() == "/webhook")
        .map(|r| String::from_utf8_lossy(&r.body).to_string())
        .expect("webhook called");
    assert!(webhook_body.contains("USD/BRL"));
}
