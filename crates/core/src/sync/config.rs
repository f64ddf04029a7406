//! Orchestrator tuning

use std::time::Duration;

use docsync_domain::constants::{
    DEFAULT_ERROR_HISTORY_LIMIT, DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_MAX_NETWORK_RETRY_DELAY_MS,
    DEFAULT_NETWORK_RETRY_DELAY_MS,
};
use docsync_domain::SyncConfig;

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Upper bound for a single fetch; an elapsed timeout counts as lost
    /// connectivity
    pub fetch_timeout: Duration,
    /// First backoff step when fetches fail with network symptoms while the
    /// monitor still reports online
    pub network_retry_delay: Duration,
    pub max_network_retry_delay: Duration,
    /// Maximum number of entries kept in the live error list
    pub error_history_limit: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            network_retry_delay: Duration::from_millis(DEFAULT_NETWORK_RETRY_DELAY_MS),
            max_network_retry_delay: Duration::from_millis(DEFAULT_MAX_NETWORK_RETRY_DELAY_MS),
            error_history_limit: DEFAULT_ERROR_HISTORY_LIMIT,
        }
    }
}

impl From<&SyncConfig> for OrchestratorConfig {
    fn from(config: &SyncConfig) -> Self {
        Self {
            fetch_timeout: config.fetch_timeout(),
            network_retry_delay: config.network_retry_delay(),
            max_network_retry_delay: config.max_network_retry_delay(),
            error_history_limit: config.error_history_limit,
        }
    }
}

impl OrchestratorConfig {
    /// Next backoff step, doubling up to the configured maximum
    pub fn next_retry_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_network_retry_delay)
    }
}
