use thiserror::Error;

#[derive(Error, Debug)]
pub enum RateWatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid quote for {pair}: {reason}")]
    InvalidQuote { pair: String, reason: String },

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("Webhook rejected message with status {status}: {body}")]
    Webhook { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, RateWatchError>;
