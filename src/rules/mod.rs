//! Change detection and threshold rules.

pub mod change;
pub mod engine;

pub use change::percent_change;
pub use engine::RuleEngine;
