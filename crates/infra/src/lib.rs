//! # DocSync Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The SQLite-backed local store with its open/reset recovery path
//! - HTTP client and the binary fetcher built on it
//! - Connectivity status and the HEAD-polling probe worker
//! - A JSON file catalog source
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `docsync-core`
//! - Depends on `docsync-common` for the SQLite pool
//! - Contains all "impure" code (I/O, network)

pub mod catalog;
pub mod config;
pub mod database;
pub mod errors;
pub mod fetch;
pub mod http;
pub mod network;

// Re-export commonly used items
pub use catalog::*;
pub use database::*;
pub use errors::*;
pub use fetch::*;
pub use http::*;
pub use network::*;
