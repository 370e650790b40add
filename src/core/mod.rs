//! Core application primitives (orchestrator, scheduler, worker HTTP)

pub mod http;
pub mod orchestrator;
pub mod scheduler;

pub use http::{create_router, AppState, HealthStatus};
pub use orchestrator::{Orchestrator, PairOutcome, PairTarget, RunSummary};
pub use scheduler::{interval_to_cron, CheckScheduler};
