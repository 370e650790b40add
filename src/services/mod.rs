//! Quote sources.

pub mod awesomeapi;
pub mod quote;

pub use awesomeapi::{AwesomeApiClient, RetryPolicy};
pub use quote::QuoteProvider;
