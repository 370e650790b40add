//! Per-pair observation history and its persistence.

pub mod store;

pub use store::{HistoryStore, InMemoryHistoryStore, JsonFileHistoryStore};

use crate::models::observation::Observation;
use serde::{Deserialize, Serialize};

/// Append-only, time-ordered observations for one pair.
///
/// Serialized as a bare JSON array so history files stay readable by other
/// tooling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<Observation>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new history with `observation` at the end. `self` is left as-is,
    /// so callers can read the previous bid before and after appending.
    pub fn append(&self, observation: Observation) -> History {
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.extend_from_slice(&self.entries);
        entries.push(observation);
        History { entries }
    }

    pub fn last(&self) -> Option<&Observation> {
        self.entries.last()
    }

    /// Bid of the most recent observation.
    pub fn last_bid(&self) -> Option<f64> {
        self.last().map(|o| o.bid)
    }

    pub fn entries(&self) -> &[Observation] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<Observation>> for History {
    fn from(entries: Vec<Observation>) -> Self {
        Self { entries }
    }
}
