//! Exchange-rate watcher: records quotes per currency pair and decides, with a
//! small threshold rule engine, when a new quote deserves a webhook alert.

pub mod config;
pub mod core;
pub mod error;
pub mod history;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod notify;
pub mod rules;
pub mod services;

pub use error::{RateWatchError, Result};
