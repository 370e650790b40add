//! Logging initialization with environment-based formatters
//!
//! - Production: JSON lines on stderr for log aggregation
//! - Sandbox: colorful, human-readable logs on stderr
//!
//! Logs go to stderr so the one-shot binary's stdout summary stays clean.

use crate::config::get_environment;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default directives when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn";

pub fn is_production(env: &str) -> bool {
    matches!(env, "production" | "prod")
}

/// Initialize the global subscriber. Call once, at the top of `main`.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if is_production(&get_environment()) {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
