//! Sync intent types
//!
//! The intent is the durable description of one download batch. It is
//! written before the first fetch and is the only record consulted to work
//! out what remains after a restart.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;
use crate::{DocSyncError, Result};

/// Status of the persisted batch descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentStatus {
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl_domain_status_conversions!(IntentStatus {
    Active => "ACTIVE",
    Paused => "PAUSED",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
});

/// One batch entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncItem {
    pub subject_id: String,
    pub display_name: String,
    pub source_url: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub remote_modified_at: DateTime<Utc>,
}

/// The single outstanding batch descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncIntent {
    /// Correlation id for logs; the record itself is always stored under
    /// the fixed key
    pub batch_id: String,
    pub date: NaiveDate,
    pub status: IntentStatus,
    pub started_at: DateTime<Utc>,
    pub items: Vec<SyncItem>,
    pub completed_ids: BTreeSet<String>,
    pub failed_ids: BTreeSet<String>,
}

impl SyncIntent {
    /// Create an ACTIVE intent with empty ledgers.
    ///
    /// Items repeating an earlier subject id are dropped so each subject is
    /// downloaded at most once per batch.
    pub fn new(batch_id: impl Into<String>, items: Vec<SyncItem>, started_at: DateTime<Utc>) -> Self {
        let mut seen = HashSet::new();
        let items = items.into_iter().filter(|item| seen.insert(item.subject_id.clone())).collect();

        Self {
            batch_id: batch_id.into(),
            date: started_at.date_naive(),
            status: IntentStatus::Active,
            started_at,
            items,
            completed_ids: BTreeSet::new(),
            failed_ids: BTreeSet::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == IntentStatus::Active
    }

    pub fn contains(&self, subject_id: &str) -> bool {
        self.items.iter().any(|item| item.subject_id == subject_id)
    }

    /// Items neither completed nor failed, in batch order
    pub fn remaining(&self) -> Vec<SyncItem> {
        self.items
            .iter()
            .filter(|item| !self.is_settled(&item.subject_id))
            .cloned()
            .collect()
    }

    pub fn remaining_count(&self) -> usize {
        self.items.iter().filter(|item| !self.is_settled(&item.subject_id)).count()
    }

    pub fn is_settled(&self, subject_id: &str) -> bool {
        self.completed_ids.contains(subject_id) || self.failed_ids.contains(subject_id)
    }

    /// Record a completion. Returns false for ids outside the batch.
    pub fn mark_completed(&mut self, subject_id: &str) -> bool {
        if !self.contains(subject_id) {
            return false;
        }
        self.failed_ids.remove(subject_id);
        self.completed_ids.insert(subject_id.to_string());
        true
    }

    /// Record a failure. Returns false for ids outside the batch or already
    /// completed.
    pub fn mark_failed(&mut self, subject_id: &str) -> bool {
        if !self.contains(subject_id) || self.completed_ids.contains(subject_id) {
            return false;
        }
        self.failed_ids.insert(subject_id.to_string());
        true
    }

    /// Check the ledger invariants of a record read back from storage.
    ///
    /// # Errors
    /// Returns `DocSyncError::InvalidState` when the ledgers overlap or name
    /// ids outside the batch.
    pub fn validate(&self) -> Result<()> {
        if let Some(id) = self.completed_ids.intersection(&self.failed_ids).next() {
            return Err(DocSyncError::InvalidState(format!(
                "intent {} lists {id} as both completed and failed",
                self.batch_id
            )));
        }

        let known: HashSet<&str> = self.items.iter().map(|i| i.subject_id.as_str()).collect();
        if let Some(id) =
            self.completed_ids.iter().chain(&self.failed_ids).find(|id| !known.contains(id.as_str()))
        {
            return Err(DocSyncError::InvalidState(format!(
                "intent {} references unknown item {id}",
                self.batch_id
            )));
        }

        Ok(())
    }
}
