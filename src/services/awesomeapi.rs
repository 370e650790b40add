//! AwesomeAPI (economia.awesomeapi.com.br) quote client.

use crate::error::{RateWatchError, Result};
use crate::models::observation::{Observation, Pair};
use crate::services::quote::QuoteProvider;
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://economia.awesomeapi.com.br";
pub const SOURCE_LABEL: &str = "awesomeapi";

/// Retry settings for transient fetch failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_times: usize,
    pub min_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_times: 3,
            min_delay: Duration::from_millis(500),
        }
    }
}

/// Quote entry as returned by `/json/last/{BASE}-{QUOTE}`. Numbers arrive as strings.
#[derive(Debug, Deserialize)]
struct LastQuote {
    bid: String,
    #[serde(default)]
    timestamp: Option<String>,
}

pub struct AwesomeApiClient {
    base_url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl AwesomeApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self, pair: &Pair) -> String {
        format!("{}/json/last/{}-{}", self.base_url, pair.base(), pair.quote())
    }

    async fn fetch_once(&self, pair: &Pair) -> Result<Observation> {
        let url = self.endpoint(pair);
        debug!(pair = %pair, url = %url, "Requesting quote for {}", pair);

        let body: HashMap<String, LastQuote> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let quote = body
            .get(&pair.code())
            .ok_or_else(|| invalid(pair, "pair missing from response"))?;

        parse_quote(pair, quote)
    }
}

#[async_trait]
impl QuoteProvider for AwesomeApiClient {
    async fn fetch_quote(&self, pair: &Pair) -> Result<Observation> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.retry.min_delay)
            .with_max_times(self.retry.max_times);

        (|| async { self.fetch_once(pair).await })
            .retry(backoff)
            .when(is_transient)
            .notify(|err: &RateWatchError, delay: Duration| {
                warn!(
                    pair = %pair,
                    error = %err,
                    retry_in_ms = delay.as_millis() as u64,
                    "Quote fetch for {} failed, retrying",
                    pair
                );
            })
            .await
    }
}

fn parse_quote(pair: &Pair, quote: &LastQuote) -> Result<Observation> {
    let bid: f64 = quote
        .bid
        .trim()
        .parse()
        .map_err(|_| invalid(pair, &format!("bid '{}' is not a number", quote.bid)))?;

    if !bid.is_finite() || bid <= 0.0 {
        return Err(invalid(pair, &format!("bid {} must be positive", bid)));
    }

    let timestamp = quote
        .timestamp
        .as_deref()
        .and_then(|ts| ts.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);

    Ok(Observation::new(pair, bid, timestamp, SOURCE_LABEL))
}

fn invalid(pair: &Pair, reason: &str) -> RateWatchError {
    RateWatchError::InvalidQuote {
        pair: pair.code(),
        reason: reason.to_string(),
    }
}

/// Timeouts, connection failures, 429 and 5xx responses are worth retrying.
fn is_transient(err: &RateWatchError) -> bool {
    match err {
        RateWatchError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e
                    .status()
                    .map(|s| s.is_server_error() || s.as_u16() == 429)
                    .unwrap_or(false)
        }
        _ => false,
    }
}
