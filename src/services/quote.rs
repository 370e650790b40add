//! Quote provider interface.

use crate::error::Result;
use crate::models::observation::{Observation, Pair};
use async_trait::async_trait;

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch the current bid for `pair`.
    ///
    /// Implementations reject non-numeric or non-positive bids, so every
    /// returned observation satisfies `bid > 0`.
    async fn fetch_quote(&self, pair: &Pair) -> Result<Observation>;
}
