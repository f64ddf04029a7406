//! # DocSync App
//!
//! Application layer - command entry points and composition root.
//!
//! This crate contains:
//! - Commands (UI shell → engine bridge)
//! - Application context (dependency injection)
//! - Tracing setup and the headless `docsync` binary
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires the SQLite store, HTTP fetcher, connectivity status, and catalog
//!   into one `SyncEngine`

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
