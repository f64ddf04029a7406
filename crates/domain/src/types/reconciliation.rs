//! Reconciliation results

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::intent::SyncItem;
use crate::impl_domain_status_conversions;

/// Classification of one remote item against the local cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconciliationStatus {
    /// Cached and fresh
    Latest,
    /// Cached, but the remote copy is newer beyond the skew tolerance
    Outdated,
    /// Not cached
    Missing,
}

impl_domain_status_conversions!(ReconciliationStatus {
    Latest => "LATEST",
    Outdated => "OUTDATED",
    Missing => "MISSING",
});

impl ReconciliationStatus {
    pub fn needs_download(&self) -> bool {
        !matches!(self, Self::Latest)
    }
}

/// Reconciliation of a whole catalog snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub statuses: HashMap<String, ReconciliationStatus>,
    pub latest: usize,
    pub outdated: usize,
    pub missing: usize,
    work: Vec<SyncItem>,
}

impl ReconciliationReport {
    /// Build a report from classified items in catalog order.
    ///
    /// Later duplicates of a subject id are ignored.
    pub fn from_classified(classified: impl IntoIterator<Item = (SyncItem, ReconciliationStatus)>) -> Self {
        let mut report = Self::default();

        for (item, status) in classified {
            if report.statuses.contains_key(&item.subject_id) {
                continue;
            }
            report.statuses.insert(item.subject_id.clone(), status);
            match status {
                ReconciliationStatus::Latest => report.latest += 1,
                ReconciliationStatus::Outdated => report.outdated += 1,
                ReconciliationStatus::Missing => report.missing += 1,
            }
            if status.needs_download() {
                report.work.push(item);
            }
        }

        report
    }

    /// MISSING and OUTDATED items in catalog order
    pub fn work_items(&self) -> &[SyncItem] {
        &self.work
    }

    pub fn into_work_items(self) -> Vec<SyncItem> {
        self.work
    }

    pub fn status_of(&self, subject_id: &str) -> Option<ReconciliationStatus> {
        self.statuses.get(subject_id).copied()
    }

    pub fn is_up_to_date(&self) -> bool {
        self.work.is_empty()
    }
}
