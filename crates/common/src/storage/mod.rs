//! Storage primitives for durable local databases
//!
//! This module provides pooled SQLite access with durability pragmas and a
//! failure classification the store owner uses to decide between reset,
//! retry, and surfacing the error.

pub mod config;
pub mod connection;
pub mod error;
pub mod metrics;
pub mod pool;
pub mod pragmas;

// Re-export commonly used types
pub use config::SqlitePoolConfig;
pub use connection::SqliteConnection;
pub use error::{StorageError, StorageRecovery, StorageResult};
pub use metrics::{PoolActivity, StorageMetrics};
pub use pool::SqlitePool;
pub use pragmas::apply_connection_pragmas;
