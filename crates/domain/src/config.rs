//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CLOCK_SKEW_TOLERANCE_MS, DEFAULT_DATABASE_FILE, DEFAULT_ERROR_HISTORY_LIMIT,
    DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_MAX_NETWORK_RETRY_DELAY_MS, DEFAULT_NETWORK_RETRY_DELAY_MS,
    DEFAULT_POOL_SIZE, DEFAULT_PROBE_INTERVAL_SECS,
};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

/// Sync configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Upper bound for a single binary download
    pub fetch_timeout_ms: u64,
    /// First backoff step while the server is unreachable but the device
    /// reports being online
    pub network_retry_delay_ms: u64,
    pub max_network_retry_delay_ms: u64,
    /// Remote timestamps may run ahead of the local clock by this much
    /// before a cached document counts as outdated
    pub clock_skew_tolerance_ms: u64,
    pub error_history_limit: usize,
    /// URL polled with HEAD requests to detect connectivity; disabled when
    /// absent
    pub probe_url: Option<String>,
    pub probe_interval_secs: u64,
    /// JSON catalog snapshot read by the file-backed catalog source
    pub catalog_path: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DATABASE_FILE.to_string(), pool_size: DEFAULT_POOL_SIZE }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            network_retry_delay_ms: DEFAULT_NETWORK_RETRY_DELAY_MS,
            max_network_retry_delay_ms: DEFAULT_MAX_NETWORK_RETRY_DELAY_MS,
            clock_skew_tolerance_ms: DEFAULT_CLOCK_SKEW_TOLERANCE_MS,
            error_history_limit: DEFAULT_ERROR_HISTORY_LIMIT,
            probe_url: None,
            probe_interval_secs: DEFAULT_PROBE_INTERVAL_SECS,
            catalog_path: None,
        }
    }
}

impl SyncConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn network_retry_delay(&self) -> Duration {
        Duration::from_millis(self.network_retry_delay_ms)
    }

    pub fn max_network_retry_delay(&self) -> Duration {
        Duration::from_millis(self.max_network_retry_delay_ms)
    }

    pub fn clock_skew_tolerance(&self) -> Duration {
        Duration::from_millis(self.clock_skew_tolerance_ms)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
