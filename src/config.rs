//! Environment-sourced configuration.
//!
//! Every binary calls `dotenvy::dotenv()` first, then builds a [`Config`] once
//! and threads it through explicitly.

use crate::error::{RateWatchError, Result};
use crate::models::alert::AlertThresholds;
use crate::models::observation::Pair;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_PAIRS: &str = "USDBRL";
pub const DEFAULT_HISTORY_DIR: &str = "data";
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_FETCH_RETRIES: usize = 3;
pub const DEFAULT_WORKER_PORT: u16 = 9100;

pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub pairs: Vec<Pair>,
    pub webhook_url: Option<Url>,
    /// Global thresholds; `buy_below` may be overridden per pair.
    pub thresholds: AlertThresholds,
    /// Per-pair buy-below levels keyed by pair code.
    pub pair_buy_below: HashMap<String, f64>,
    pub history_dir: PathBuf,
    pub quote_api_url: String,
    pub http_timeout: Duration,
    pub fetch_retries: usize,
    pub check_interval_seconds: u64,
    pub worker_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. `from_env` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let pairs = get("PAIRS")
            .unwrap_or_else(|| DEFAULT_PAIRS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::parse::<Pair>)
            .collect::<Result<Vec<_>>>()?;

        if pairs.is_empty() {
            return Err(RateWatchError::Config("PAIRS must name at least one pair".into()));
        }

        let webhook_url = get("DISCORD_WEBHOOK_URL")
            .map(|raw| parse_webhook_url(&raw))
            .transpose()?;

        let thresholds = AlertThresholds {
            buy_below: get("BUY_BELOW").as_deref().and_then(parse_float),
            alert_drop_pct: get("ALERT_DROP_PCT").as_deref().and_then(parse_float),
            alert_rise_pct: get("ALERT_RISE_PCT").as_deref().and_then(parse_float),
            always_notify: parse_bool(get("ALWAYS_NOTIFY").as_deref(), false),
        };

        let pair_buy_below = pairs
            .iter()
            .filter_map(|pair| {
                let code = pair.code();
                get(&format!("BUY_BELOW_{}", code))
                    .as_deref()
                    .and_then(parse_float)
                    .map(|level| (code, level))
            })
            .collect();

        let http_timeout_seconds = get("HTTP_TIMEOUT_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECONDS);
        if http_timeout_seconds == 0 {
            return Err(RateWatchError::Config(
                "HTTP_TIMEOUT_SECONDS must be greater than 0".into(),
            ));
        }
        let http_timeout = Duration::from_secs(http_timeout_seconds);

        Ok(Self {
            environment: get("APP_ENV").unwrap_or_else(|| "sandbox".to_string()),
            pairs,
            webhook_url,
            thresholds,
            pair_buy_below,
            history_dir: get("HISTORY_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_DIR)),
            quote_api_url: get("QUOTE_API_URL")
                .unwrap_or_else(|| crate::services::awesomeapi::DEFAULT_BASE_URL.to_string()),
            http_timeout,
            fetch_retries: get("FETCH_RETRIES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_FETCH_RETRIES),
            check_interval_seconds: get("CHECK_INTERVAL_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            worker_port: get("WORKER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_WORKER_PORT),
        })
    }

    /// Thresholds for one pair: the global set with any per-pair buy-below applied.
    pub fn thresholds_for(&self, pair: &Pair) -> AlertThresholds {
        let mut thresholds = self.thresholds.clone();
        if let Some(level) = self.pair_buy_below.get(&pair.code()) {
            thresholds.buy_below = Some(*level);
        }
        thresholds
    }
}

/// Parse a decimal that may use a comma separator (`5,10`). Empty or
/// unparsable input is treated as unset.
pub fn parse_float(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `1`, `true`, `yes`, `y` and `on` (any case) are true; unset falls back to `default`.
pub fn parse_bool(raw: Option<&str>, default: bool) -> bool {
    match raw.map(|v| v.trim().to_ascii_lowercase()) {
        None => default,
        Some(v) if v.is_empty() => default,
        Some(v) => matches!(v.as_str(), "1" | "true" | "yes" | "y" | "on"),
    }
}

fn parse_webhook_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| RateWatchError::Config(format!("invalid DISCORD_WEBHOOK_URL: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RateWatchError::Config(format!(
            "DISCORD_WEBHOOK_URL must be http(s), got '{}'",
            other
        ))),
    }
}
