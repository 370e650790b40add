//! Tracked currency pairs and the quotes recorded for them.

use crate::error::RateWatchError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A base/quote currency pair such as USD/BRL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair {
    base: String,
    quote: String,
}

impl Pair {
    pub fn new(base: &str, quote: &str) -> Self {
        Self {
            base: base.trim().to_ascii_uppercase(),
            quote: quote.trim().to_ascii_uppercase(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Concatenated code used as the history key, e.g. `USDBRL`.
    pub fn code(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }

    /// Human-facing name, e.g. `USD/BRL`.
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, self.quote)
    }
}

/// Accepts `USDBRL`, `usd-brl` and `USD/BRL`.
impl FromStr for Pair {
    type Err = RateWatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let parts = match raw.len() {
            6 => raw.get(..3).zip(raw.get(3..)),
            7 if matches!(raw.as_bytes()[3], b'-' | b'/') => raw.get(..3).zip(raw.get(4..)),
            _ => None,
        };

        match parts {
            Some((base, quote)) if is_currency_code(base) && is_currency_code(quote) => {
                Ok(Self::new(base, quote))
            }
            _ => Err(RateWatchError::Config(format!(
                "invalid currency pair '{}': expected six letters like USDBRL",
                raw
            ))),
        }
    }
}

fn is_currency_code(code: &str) -> bool {
    code.chars().all(|c| c.is_ascii_alphabetic())
}

/// One recorded quote for a tracked pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Older history files predate this field; the store fills it in on load.
    #[serde(default)]
    pub pair: String,
    pub bid: f64,
    pub timestamp_iso: String,
    #[serde(default)]
    pub source: String,
}

impl Observation {
    pub fn new(pair: &Pair, bid: f64, timestamp: DateTime<Utc>, source: impl Into<String>) -> Self {
        Self {
            pair: pair.code(),
            bid,
            timestamp_iso: timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            source: source.into(),
        }
    }

    /// Base currency code, taken from the first three characters of the pair.
    pub fn base_currency(&self) -> &str {
        self.pair.get(..3).unwrap_or(self.pair.as_str())
    }

    /// `USD/BRL` for six-letter pairs, the raw identifier otherwise.
    pub fn pair_label(&self) -> String {
        match (self.pair.get(..3), self.pair.get(3..)) {
            (Some(base), Some(quote)) if self.pair.len() == 6 => format!("{}/{}", base, quote),
            _ => self.pair.clone(),
        }
    }
}
