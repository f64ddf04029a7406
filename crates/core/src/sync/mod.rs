//! Sync orchestration

pub mod config;
pub mod orchestrator;
pub mod ports;
pub mod state;

pub use config::OrchestratorConfig;
pub use orchestrator::SyncOrchestrator;
pub use state::{StateHub, Subscription};
