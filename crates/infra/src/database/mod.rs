//! Database implementations

mod columns;
pub mod counters_repository;
pub mod document_repository;
pub mod intent_repository;
pub mod local_store;
pub mod manager;

pub use counters_repository::*;
pub use document_repository::*;
pub use intent_repository::*;
pub use local_store::*;
pub use manager::DbManager;
