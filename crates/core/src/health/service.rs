//! Startup health and verification service
//!
//! Proves the local store is usable before any offline-dependent UI
//! renders: opens the store, verifies every cached document, rebuilds the
//! presence index from what it found, and asks the orchestrator whether an
//! unfinished batch is waiting.

use std::sync::Arc;

use docsync_domain::HealthCheckResult;
use tracing::{error, info, instrument, warn};

use super::cache_index::CacheIndex;
use crate::storage::ports::LocalStore;
use crate::sync::SyncOrchestrator;

pub struct HealthService {
    store: Arc<dyn LocalStore>,
    cache_index: Arc<CacheIndex>,
    orchestrator: Arc<SyncOrchestrator>,
}

impl HealthService {
    pub fn new(
        store: Arc<dyn LocalStore>,
        cache_index: Arc<CacheIndex>,
        orchestrator: Arc<SyncOrchestrator>,
    ) -> Self {
        Self { store, cache_index, orchestrator }
    }

    /// Run the startup checks.
    ///
    /// Never fails: every error is reported through
    /// [`HealthCheckResult::error`] with `healthy = false`. Documents that
    /// fail verification are counted, never deleted.
    #[instrument(skip(self))]
    pub async fn check_health(&self) -> HealthCheckResult {
        if let Err(err) = self.store.open().await {
            error!(error = %err, "Local store could not be opened");
            return HealthCheckResult::unhealthy(false, err.to_string());
        }

        let stores_accessible = match self.store.probe().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "Local store probe failed");
                false
            }
        };

        let summaries = match self.store.list_summaries().await {
            Ok(summaries) => summaries,
            Err(err) => {
                error!(error = %err, "Failed to enumerate cached documents");
                return HealthCheckResult {
                    stores_accessible,
                    ..HealthCheckResult::unhealthy(true, err.to_string())
                };
            }
        };

        let total_count = summaries.len();
        let mut verified = Vec::with_capacity(total_count);
        for summary in summaries {
            if summary.is_structurally_valid() {
                verified.push(summary.subject_id);
            } else {
                warn!(
                    subject_id = %summary.subject_id,
                    size_bytes = summary.size_bytes,
                    blob_len = summary.blob_len,
                    "Cached document failed verification"
                );
            }
        }
        let verified_count = verified.len();
        let failed_count = total_count - verified_count;

        self.cache_index.rebuild(verified);

        let mut result = HealthCheckResult {
            healthy: stores_accessible,
            db_accessible: true,
            stores_accessible,
            total_count,
            verified_count,
            failed_count,
            ..HealthCheckResult::default()
        };

        match self.orchestrator.initialize().await {
            Ok(pending) => {
                result.has_pending_sync = pending.is_some();
                result.pending_count = pending.map_or(0, |p| p.pending_count);
            }
            Err(err) => {
                error!(error = %err, "Failed to read sync intent");
                result.healthy = false;
                result.error = Some(err.to_string());
            }
        }

        if !stores_accessible && result.error.is_none() {
            result.error = Some("One or more record families are unreadable".to_string());
        }

        info!(
            healthy = result.healthy,
            total = total_count,
            verified = verified_count,
            failed = failed_count,
            pending = result.pending_count,
            "Health check finished"
        );
        result
    }
}
