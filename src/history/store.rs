//! History persistence backends.

use crate::error::Result;
use crate::history::History;
use crate::models::observation::{Observation, Pair};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Load the history for a pair. A pair with no stored history yields an
    /// empty one rather than an error.
    async fn load(&self, pair: &Pair) -> Result<History>;

    /// Replace the stored history for a pair.
    async fn save(&self, pair: &Pair, history: &History) -> Result<()>;
}

/// Stores each pair as `<dir>/<pair lowercase>.json`.
pub struct JsonFileHistoryStore {
    dir: PathBuf,
}

impl JsonFileHistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, pair: &Pair) -> PathBuf {
        self.dir
            .join(format!("{}.json", pair.code().to_ascii_lowercase()))
    }
}

#[async_trait]
impl HistoryStore for JsonFileHistoryStore {
    async fn load(&self, pair: &Pair) -> Result<History> {
        let path = self.path_for(pair);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(pair = %pair, path = %path.display(), "No history file yet for {}", pair);
                return Ok(History::new());
            }
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(History::new());
        }

        let mut entries: Vec<Observation> = serde_json::from_str(&raw)?;
        let code = pair.code();
        for entry in entries.iter_mut().filter(|e| e.pair.is_empty()) {
            entry.pair = code.clone();
        }

        debug!(
            pair = %pair,
            count = entries.len(),
            "Loaded {} observations for {}",
            entries.len(),
            pair
        );
        Ok(History::from(entries))
    }

    async fn save(&self, pair: &Pair, history: &History) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(pair);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(history)?;

        // Full overwrite through a temp file and rename.
        tokio::fs::write(&tmp, json.as_bytes()).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(
            pair = %pair,
            count = history.len(),
            path = %path.display(),
            "Saved history for {}",
            pair
        );
        Ok(())
    }
}

/// Keeps histories in memory. Used for dry runs and tests.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    histories: RwLock<HashMap<String, History>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(pair: &Pair, history: History) -> Self {
        let mut histories = HashMap::new();
        histories.insert(pair.code(), history);
        Self {
            histories: RwLock::new(histories),
        }
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn load(&self, pair: &Pair) -> Result<History> {
        let histories = self.histories.read().await;
        Ok(histories.get(&pair.code()).cloned().unwrap_or_default())
    }

    async fn save(&self, pair: &Pair, history: &History) -> Result<()> {
        let mut histories = self.histories.write().await;
        histories.insert(pair.code(), history.clone());
        Ok(())
    }
}
