//! Reconciliation of a remote catalog against the local cache

mod engine;

pub use engine::{local_cache_from, reconcile, LocalCache, ReconciliationEngine};
