//! Observable orchestrator state

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Orchestrator lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    #[default]
    Idle,
    Checking,
    Syncing,
    Paused,
    Completed,
    Error,
    Cancelled,
}

impl_domain_status_conversions!(SyncStatus {
    Idle => "IDLE",
    Checking => "CHECKING",
    Syncing => "SYNCING",
    Paused => "PAUSED",
    Completed => "COMPLETED",
    Error => "ERROR",
    Cancelled => "CANCELLED",
});

impl SyncStatus {
    /// A batch is in flight
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Checking | Self::Syncing | Self::Paused)
    }

    /// Finished states that wait for acknowledgement
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// One entry of the live error list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncItemError {
    pub subject_id: String,
    pub display_name: String,
    pub message: String,
}

/// Snapshot emitted to observers on every state change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    pub status: SyncStatus,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub errors: Vec<SyncItemError>,
    pub has_pending_resume: bool,
    pub pending_count: usize,
    pub current_item: Option<String>,
}

impl SyncState {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Items that are neither completed nor failed
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed + self.failed)
    }
}

/// An unfinished batch found at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingResume {
    pub pending_count: usize,
}
