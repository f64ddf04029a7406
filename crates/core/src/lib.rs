//! # DocSync Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for storage, fetching, connectivity
//!   and the remote catalog
//! - The reconciliation engine
//! - The sync orchestrator and its observable state
//! - The startup health service and the cache presence index
//! - The [`SyncEngine`] facade consumed by the application layer
//!
//! ## Architecture Principles
//! - Only depends on `docsync-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod engine;
pub mod health;
pub mod reconciliation;
pub mod storage;
pub mod sync;

// Re-export specific items to avoid ambiguity
pub use engine::SyncEngine;
pub use health::{CacheIndex, HealthService};
pub use reconciliation::ReconciliationEngine;
pub use storage::ports::{CountersStore, DocumentStore, IntentStore, LocalStore};
pub use sync::ports::{BinaryFetcher, CatalogSource, ConnectivityMonitor};
pub use sync::{OrchestratorConfig, Subscription, SyncOrchestrator};
