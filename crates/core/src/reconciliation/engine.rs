//! Reconciliation engine
//!
//! Classifies remote items as LATEST, OUTDATED, or MISSING by comparing the
//! remote modification time with the local download time. Only
//! remote-driven items are classified; local documents absent from the
//! catalog are ignored.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use docsync_domain::constants::DEFAULT_CLOCK_SKEW_TOLERANCE_MS;
use docsync_domain::{
    CatalogEntry, DocumentSummary, ReconciliationReport, ReconciliationStatus, SyncItem,
};
use tracing::debug;

/// Download time of every usable cached document, keyed by subject id
pub type LocalCache = HashMap<String, DateTime<Utc>>;

/// Classify each remote item against the local cache.
///
/// An item is OUTDATED only when the remote copy is newer than the local
/// download by more than `tolerance`.
pub fn reconcile(
    remote_items: &[SyncItem],
    local_cache: &LocalCache,
    tolerance: Duration,
) -> HashMap<String, ReconciliationStatus> {
    remote_items
        .iter()
        .map(|item| (item.subject_id.clone(), classify(item, local_cache, tolerance)))
        .collect()
}

/// Build the local cache map from stored metadata.
///
/// Structurally invalid documents are left out so they are downloaded
/// again.
pub fn local_cache_from(summaries: &[DocumentSummary]) -> LocalCache {
    summaries
        .iter()
        .filter(|summary| summary.is_structurally_valid())
        .map(|summary| (summary.subject_id.clone(), summary.downloaded_at))
        .collect()
}

fn classify(item: &SyncItem, local_cache: &LocalCache, tolerance: Duration) -> ReconciliationStatus {
    let Some(downloaded_at) = local_cache.get(&item.subject_id) else {
        return ReconciliationStatus::Missing;
    };

    let tolerance_ms = i64::try_from(tolerance.as_millis()).unwrap_or(i64::MAX);
    let remote_ms = item.remote_modified_at.timestamp_millis();
    let local_ms = downloaded_at.timestamp_millis();

    if remote_ms > local_ms.saturating_add(tolerance_ms) {
        ReconciliationStatus::Outdated
    } else {
        ReconciliationStatus::Latest
    }
}

/// Reconciliation engine with a configurable clock-skew tolerance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciliationEngine {
    tolerance: Duration,
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self { tolerance: Duration::from_millis(DEFAULT_CLOCK_SKEW_TOLERANCE_MS) }
    }
}

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(tolerance: Duration) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> Duration {
        self.tolerance
    }

    pub fn reconcile(
        &self,
        remote_items: &[SyncItem],
        local_cache: &LocalCache,
    ) -> HashMap<String, ReconciliationStatus> {
        reconcile(remote_items, local_cache, self.tolerance)
    }

    /// Reconcile a catalog snapshot into a report listing the work items in
    /// catalog order.
    pub fn reconcile_catalog(
        &self,
        entries: Vec<CatalogEntry>,
        local_cache: &LocalCache,
    ) -> ReconciliationReport {
        let report = ReconciliationReport::from_classified(entries.into_iter().map(|entry| {
            let item = SyncItem::from(entry);
            let status = classify(&item, local_cache, self.tolerance);
            (item, status)
        }));

        debug!(
            latest = report.latest,
            outdated = report.outdated,
            missing = report.missing,
            "Catalog reconciled"
        );
        report
    }
}
