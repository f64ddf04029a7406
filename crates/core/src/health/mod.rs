//! Startup verification and the cache presence index

pub mod cache_index;
pub mod service;

pub use cache_index::CacheIndex;
pub use service::HealthService;
