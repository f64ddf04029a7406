//! Sync engine facade
//!
//! Wires the local store, reconciliation, orchestrator, and health service
//! together and exposes the operations a UI shell calls.

use std::sync::Arc;

use docsync_domain::{
    DocSyncError, HealthCheckResult, ReconciliationReport, Result, SessionCounters, SyncConfig,
    SyncItem, SyncState,
};
use tokio::sync::watch;
use tracing::{info, instrument};

use crate::health::{CacheIndex, HealthService};
use crate::reconciliation::{local_cache_from, ReconciliationEngine};
use crate::storage::ports::LocalStore;
use crate::sync::ports::{BinaryFetcher, CatalogSource, ConnectivityMonitor};
use crate::sync::{OrchestratorConfig, Subscription, SyncOrchestrator};

/// Entry point for UI-facing sync operations
pub struct SyncEngine {
    store: Arc<dyn LocalStore>,
    catalog: Arc<dyn CatalogSource>,
    cache_index: Arc<CacheIndex>,
    orchestrator: Arc<SyncOrchestrator>,
    health: HealthService,
    reconciler: ReconciliationEngine,
}

impl SyncEngine {
    pub fn new(
        store: Arc<dyn LocalStore>,
        fetcher: Arc<dyn BinaryFetcher>,
        connectivity: Arc<dyn ConnectivityMonitor>,
        catalog: Arc<dyn CatalogSource>,
        config: &SyncConfig,
    ) -> Self {
        let cache_index = Arc::new(CacheIndex::new());
        let orchestrator = Arc::new(SyncOrchestrator::new(
            Arc::clone(&store),
            fetcher,
            connectivity,
            Arc::clone(&cache_index),
            OrchestratorConfig::from(config),
        ));
        let health =
            HealthService::new(Arc::clone(&store), Arc::clone(&cache_index), Arc::clone(&orchestrator));

        Self {
            store,
            catalog,
            cache_index,
            orchestrator,
            health,
            reconciler: ReconciliationEngine::with_tolerance(config.clock_skew_tolerance()),
        }
    }

    pub fn orchestrator(&self) -> &Arc<SyncOrchestrator> {
        &self.orchestrator
    }

    pub async fn check_health(&self) -> HealthCheckResult {
        self.health.check_health().await
    }

    /// Reconcile a fresh catalog snapshot against the local cache.
    ///
    /// # Errors
    /// Returns catalog or storage errors.
    pub async fn reconcile(&self) -> Result<ReconciliationReport> {
        let entries = self.catalog.snapshot().await?;
        let summaries = self.store.list_summaries().await?;
        Ok(self.reconciler.reconcile_catalog(entries, &local_cache_from(&summaries)))
    }

    /// "Start Day": reconcile the catalog and download what is missing or
    /// outdated.
    ///
    /// # Errors
    /// Returns catalog or storage errors, or `InvalidState` when a batch is
    /// already running.
    #[instrument(skip(self))]
    pub async fn start_day(&self) -> Result<SyncState> {
        if self.orchestrator.is_running() {
            return Err(DocSyncError::InvalidState("A sync batch is already running".to_string()));
        }

        let report = self.reconcile().await?;
        info!(
            latest = report.latest,
            outdated = report.outdated,
            missing = report.missing,
            "Starting day sync"
        );
        self.orchestrator.start_batch(report.into_work_items()).await
    }

    pub async fn start_batch(&self, items: Vec<SyncItem>) -> Result<SyncState> {
        self.orchestrator.start_batch(items).await
    }

    pub async fn resume_batch(&self) -> Result<SyncState> {
        self.orchestrator.resume_batch().await
    }

    pub async fn cancel_sync(&self) -> Result<()> {
        self.orchestrator.cancel_batch().await
    }

    pub fn acknowledge(&self) -> Result<()> {
        self.orchestrator.acknowledge()
    }

    pub fn current_state(&self) -> SyncState {
        self.orchestrator.current_state()
    }

    pub fn watch(&self) -> watch::Receiver<SyncState> {
        self.orchestrator.watch()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SyncState) + Send + Sync + 'static,
    {
        self.orchestrator.subscribe(listener)
    }

    /// Answer from the presence index without touching storage.
    pub fn is_cached_sync(&self, subject_id: &str) -> bool {
        self.cache_index.contains(subject_id)
    }

    /// Body of a usable cached document.
    ///
    /// # Errors
    /// Returns storage errors.
    pub async fn get_cached_binary(&self, subject_id: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .store
            .get_document(subject_id)
            .await?
            .filter(|document| document.is_structurally_valid())
            .map(|document| document.blob))
    }

    /// Delete one cached document at the user's request.
    ///
    /// # Errors
    /// Returns storage errors.
    #[instrument(skip(self))]
    pub async fn remove_document(&self, subject_id: &str) -> Result<bool> {
        let removed = self.store.delete_document(subject_id).await?;
        self.cache_index.remove(subject_id);
        if removed {
            info!(subject_id, "Cached document removed");
        }
        Ok(removed)
    }

    /// Operator recovery: drop and recreate the store, then re-run the
    /// health check.
    ///
    /// # Errors
    /// Returns `InvalidState` while a batch runs, or the reset failure.
    #[instrument(skip(self))]
    pub async fn reset_storage(&self) -> Result<HealthCheckResult> {
        self.orchestrator.reset_state()?;

        self.store.reset().await?;
        self.cache_index.clear();
        info!("Local storage reset");

        Ok(self.check_health().await)
    }

    /// Last-run summary for cheap display.
    ///
    /// # Errors
    /// Returns storage errors.
    pub async fn session_counters(&self) -> Result<Option<SessionCounters>> {
        self.store.get_counters().await
    }
}
