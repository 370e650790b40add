//! Alert composition and delivery.

pub mod composer;
pub mod webhook;

pub use composer::{compose_block, compose_digest};
pub use webhook::DiscordWebhook;

use crate::error::Result;
use async_trait::async_trait;

/// Destination for composed alert messages. Delivery is best effort.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
}
