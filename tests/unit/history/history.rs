//! Unit tests for the history value type

use ratewatch::history::History;
use ratewatch::models::observation::Observation;

fn obs(bid: f64, ts: &str) -> Observation {
    Observation {
        pair: "USDBRL".to_string(),
        bid,
        timestamp_iso: ts.to_string(),
        source: "test".to_string(),
    }
}

#[test]
fn test_empty_history_has_no_last_bid() {
    let history = History::new();
    assert!(history.is_empty());
    assert_eq!(history.last_bid(), None);
}

#[test]
fn test_append_returns_new_history() {
    let original = History::from(vec![obs(5.0, "2024-01-01T00:00:00Z")]);
    let updated = original.append(obs(5.1, "2024-01-02T00:00:00Z"));

    assert_eq!(original.len(), 1);
    assert_eq!(original.last_bid(), Some(5.0));
    assert_eq!(updated.len(), 2);
    assert_eq!(updated.last_bid(), Some(5.1));
}

#[test]
fn test_append_keeps_prior_entries_in_order() {
    let history = History::new()
        .append(obs(5.0, "2024-01-01T00:00:00Z"))
        .append(obs(5.2, "2024-01-02T00:00:00Z"))
        .append(obs(4.9, "2024-01-03T00:00:00Z"));

    let bids: Vec<f64> = history.entries().iter().map(|o| o.bid).collect();
    assert_eq!(bids, vec![5.0, 5.2, 4.9]);
    assert_eq!(history.last().unwrap().timestamp_iso, "2024-01-03T00:00:00Z");
}

#[test]
fn test_serializes_as_bare_array() {
    let history = History::new().append(obs(5.0, "2024-01-01T00:00:00Z"));
    let json = serde_json::to_value(&history).unwrap();
    assert!(json.is_array());
    assert_eq!(json[0]["bid"], 5.0);
    assert_eq!(json[0]["timestamp_iso"], "2024-01-01T00:00:00Z");
}
