//! Domain types

pub mod catalog;
pub mod counters;
pub mod document;
pub mod health;
pub mod intent;
pub mod reconciliation;
pub mod sync_state;

pub use catalog::CatalogEntry;
pub use counters::SessionCounters;
pub use document::{CachedDocument, DocumentState, DocumentSummary};
pub use health::HealthCheckResult;
pub use intent::{IntentStatus, SyncIntent, SyncItem};
pub use reconciliation::{ReconciliationReport, ReconciliationStatus};
pub use sync_state::{PendingResume, SyncItemError, SyncState, SyncStatus};
