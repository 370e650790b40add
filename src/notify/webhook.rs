//! Discord webhook delivery.

use crate::error::{RateWatchError, Result};
use crate::notify::AlertSink;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Discord rejects message content above this many characters.
pub const DISCORD_CONTENT_LIMIT: usize = 2000;

pub struct DiscordWebhook {
    url: Url,
    client: reqwest::Client,
}

impl DiscordWebhook {
    pub fn new(url: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(url, client))
    }

    pub fn with_client(url: Url, client: reqwest::Client) -> Self {
        Self { url, client }
    }
}

#[async_trait]
impl AlertSink for DiscordWebhook {
    async fn send(&self, message: &str) -> Result<()> {
        let content = truncate_content(message, DISCORD_CONTENT_LIMIT);
        if content.len() != message.len() {
            debug!(
                original_chars = message.chars().count(),
                limit = DISCORD_CONTENT_LIMIT,
                "Alert message truncated to Discord limit"
            );
        }

        let response = self
            .client
            .post(self.url.clone())
            .json(&json!({ "content": content }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RateWatchError::Webhook {
                status: status.as_u16(),
                body,
            });
        }

        info!(status = status.as_u16(), "Alert delivered to Discord webhook");
        Ok(())
    }
}

/// Cut `message` to at most `limit` characters, ending with an ellipsis when cut.
pub fn truncate_content(message: &str, limit: usize) -> String {
    if message.chars().count() <= limit {
        return message.to_string();
    }
    let mut out: String = message.chars().take(limit.saturating_sub(1)).collect();
    out.push('…');
    out
}
