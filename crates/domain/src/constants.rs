//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Single-record keys
pub const INTENT_KEY: &str = "current";
pub const COUNTERS_KEY: &str = "current";

// Reconciliation
pub const DEFAULT_CLOCK_SKEW_TOLERANCE_MS: u64 = 10_000;

// Orchestrator defaults
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_NETWORK_RETRY_DELAY_MS: u64 = 2_000;
pub const DEFAULT_MAX_NETWORK_RETRY_DELAY_MS: u64 = 30_000;
pub const DEFAULT_ERROR_HISTORY_LIMIT: usize = 50;

// Storage
pub const DEFAULT_DATABASE_FILE: &str = "docsync.db";
pub const DEFAULT_POOL_SIZE: u32 = 4;
pub const SCHEMA_VERSION: i32 = 1;

// Connectivity probe
pub const DEFAULT_PROBE_INTERVAL_SECS: u64 = 15;

// Catalog
pub const DEFAULT_CATALOG_FILE: &str = "catalog.json";
