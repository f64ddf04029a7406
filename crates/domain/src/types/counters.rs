//! Session counters
//!
//! A cheap last-run summary for UI display. It is derived from the intent
//! and the cached documents and is never authoritative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sync_state::SyncStatus;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounters {
    pub last_sync_time: Option<DateTime<Utc>>,
    pub total_doctors: u32,
    pub synced_count: u32,
    pub failed_count: u32,
    pub status: SyncStatus,
}
