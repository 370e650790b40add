//! Shared data models spanning the watcher layers.

pub mod alert;
pub mod observation;

pub use alert::{AlertThresholds, Decision};
pub use observation::{Observation, Pair};
