//! Startup health check result

use serde::{Deserialize, Serialize};

/// Outcome of the startup storage and cache verification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub healthy: bool,
    /// The local store opened (possibly after one automatic reset)
    pub db_accessible: bool,
    /// Every record family could be read
    pub stores_accessible: bool,
    pub total_count: usize,
    pub verified_count: usize,
    pub failed_count: usize,
    pub has_pending_sync: bool,
    pub pending_count: usize,
    pub error: Option<String>,
}

impl HealthCheckResult {
    /// Unhealthy result carrying the failure message
    pub fn unhealthy(db_accessible: bool, error: impl Into<String>) -> Self {
        Self { healthy: false, db_accessible, error: Some(error.into()), ..Self::default() }
    }
}
