//! Sync orchestrator
//!
//! Runs one download batch at a time. The batch is described by a durable
//! [`SyncIntent`] written before any network access; progress is written to
//! it after every item, so a batch interrupted by process death resumes from
//! the last persisted item.
//!
//! ## Lifecycle
//! `IDLE -> CHECKING -> SYNCING <-> PAUSED -> COMPLETED | ERROR`, with
//! `CANCELLED` reachable from every non-terminal state.
//!
//! ## Failure handling
//! - Lost connectivity pauses the batch and retries the same item once the
//!   network is back; it never consumes the item.
//! - A content failure (bad status, empty body, unstorable document) marks
//!   the item failed for this batch and moves on.
//! - A failure to persist the intent aborts the batch into ERROR; the last
//!   durable intent stays ACTIVE for a later resume.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use docsync_domain::{
    CachedDocument, DocSyncError, DocumentSummary, FetchError, IntentStatus, PendingResume,
    Result, SessionCounters, SyncIntent, SyncItem, SyncItemError, SyncState, SyncStatus,
};
use parking_lot::Mutex;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::config::OrchestratorConfig;
use super::ports::{BinaryFetcher, ConnectivityMonitor};
use super::state::{StateHub, Subscription};
use crate::health::CacheIndex;
use crate::storage::ports::LocalStore;

/// Stateful coordinator of download batches
pub struct SyncOrchestrator {
    store: Arc<dyn LocalStore>,
    fetcher: Arc<dyn BinaryFetcher>,
    connectivity: Arc<dyn ConnectivityMonitor>,
    cache_index: Arc<CacheIndex>,
    config: OrchestratorConfig,
    state: StateHub,
    run_lock: AsyncMutex<()>,
    cancel_token: Mutex<CancellationToken>,
}

impl SyncOrchestrator {
    pub fn new(
        store: Arc<dyn LocalStore>,
        fetcher: Arc<dyn BinaryFetcher>,
        connectivity: Arc<dyn ConnectivityMonitor>,
        cache_index: Arc<CacheIndex>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            fetcher,
            connectivity,
            cache_index,
            config,
            state: StateHub::new(),
            run_lock: AsyncMutex::new(()),
            cancel_token: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Latest published snapshot
    pub fn current_state(&self) -> SyncState {
        self.state.current()
    }

    pub fn watch(&self) -> watch::Receiver<SyncState> {
        self.state.watch()
    }

    /// Register a synchronous listener; see [`StateHub::subscribe`].
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SyncState) + Send + Sync + 'static,
    {
        self.state.subscribe(listener)
    }

    /// True while a batch holds the run lock
    pub fn is_running(&self) -> bool {
        self.run_lock.try_lock().is_err()
    }

    /// Load the persisted intent and report unfinished work.
    ///
    /// # Errors
    /// Returns storage errors from reading the intent.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<Option<PendingResume>> {
        let pending = self.pending_resume().await?;
        self.apply_pending(pending);

        match pending {
            Some(p) => info!(pending_count = p.pending_count, "Unfinished sync batch found"),
            None => debug!("No unfinished sync batch"),
        }
        Ok(pending)
    }

    /// Start a fresh batch over `items`.
    ///
    /// Resolves when the batch reaches a terminal state or is cancelled and
    /// returns the final snapshot.
    ///
    /// # Errors
    /// - `DocSyncError::InvalidState` if a batch is already running
    /// - the storage error that aborted the batch into ERROR
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub async fn start_batch(&self, items: Vec<SyncItem>) -> Result<SyncState> {
        let _guard = self.run_lock.try_lock().map_err(|_| already_running())?;
        let token = self.fresh_token();

        self.run_fresh(items, &token).await
    }

    /// Continue the persisted ACTIVE intent, skipping reconciliation.
    ///
    /// With nothing to resume this returns the current snapshot unchanged.
    ///
    /// # Errors
    /// - `DocSyncError::InvalidState` if a batch is already running
    /// - storage errors reading the intent or aborting the batch
    #[instrument(skip(self))]
    pub async fn resume_batch(&self) -> Result<SyncState> {
        let _guard = self.run_lock.try_lock().map_err(|_| already_running())?;
        let token = self.fresh_token();

        self.run_resume(&token).await
    }

    /// Cancel the running batch, or the persisted ACTIVE intent when no
    /// batch is running.
    ///
    /// Cancellation of a running batch is cooperative: an in-flight fetch
    /// finishes first. This returns once CANCELLED has been recorded.
    /// Documents downloaded so far stay cached.
    ///
    /// # Errors
    /// Returns storage errors from reading the persisted intent.
    #[instrument(skip(self))]
    pub async fn cancel_batch(&self) -> Result<()> {
        if let Ok(_guard) = self.run_lock.try_lock() {
            return self.cancel_persisted().await;
        }

        info!("Cancelling running sync batch");
        self.cancel_token.lock().cancel();

        // The processing loop records the cancellation before releasing.
        let _guard = self.run_lock.lock().await;
        Ok(())
    }

    /// Return a COMPLETED or ERROR orchestrator to IDLE without touching
    /// storage.
    ///
    /// # Errors
    /// Returns `DocSyncError::InvalidState` while a batch is running.
    pub fn acknowledge(&self) -> Result<()> {
        let current = self.state.current();
        if current.status.is_running() {
            return Err(DocSyncError::InvalidState(
                "Cannot acknowledge a running sync batch".to_string(),
            ));
        }

        if current.status.is_terminal() {
            self.state.publish(SyncState {
                has_pending_resume: current.has_pending_resume,
                pending_count: current.pending_count,
                ..SyncState::idle()
            });
        }
        Ok(())
    }

    /// Publish a blank IDLE snapshot, used after the store was reset.
    ///
    /// # Errors
    /// Returns `DocSyncError::InvalidState` while a batch is running.
    pub fn reset_state(&self) -> Result<()> {
        if self.is_running() {
            return Err(already_running());
        }
        self.state.publish(SyncState::idle());
        Ok(())
    }

    async fn run_fresh(&self, items: Vec<SyncItem>, token: &CancellationToken) -> Result<SyncState> {
        let mut intent = SyncIntent::new(Uuid::now_v7().to_string(), items, Utc::now());
        let mut errors = Vec::new();
        info!(batch_id = %intent.batch_id, total = intent.items.len(), "Starting sync batch");

        // Durable before any network access.
        if let Err(err) = self.persist(&intent, SyncStatus::Checking).await {
            return Err(self.abort(&intent, &mut errors, err).await);
        }
        self.state.publish(self.snapshot(&intent, SyncStatus::Checking, &errors, None));

        let fresh = self.already_fresh(&intent).await;
        if !fresh.is_empty() {
            for subject_id in &fresh {
                intent.mark_completed(subject_id);
            }
            debug!(batch_id = %intent.batch_id, skipped = fresh.len(), "Items already cached");

            if let Err(err) = self.persist(&intent, SyncStatus::Checking).await {
                return Err(self.abort(&intent, &mut errors, err).await);
            }
        }

        self.process(&mut intent, &mut errors, token).await
    }

    async fn run_resume(&self, token: &CancellationToken) -> Result<SyncState> {
        let Some(mut intent) = self.load_intent().await? else {
            info!("No sync intent to resume");
            self.apply_pending(None);
            return Ok(self.state.current());
        };

        if !intent.is_active() {
            debug!(batch_id = %intent.batch_id, status = %intent.status, "Clearing settled sync intent");
            self.store.clear_intent().await?;
            self.apply_pending(None);
            return Ok(self.state.current());
        }

        let mut errors = Vec::new();
        info!(
            batch_id = %intent.batch_id,
            remaining = intent.remaining_count(),
            completed = intent.completed_ids.len(),
            failed = intent.failed_ids.len(),
            "Resuming sync batch"
        );

        self.process(&mut intent, &mut errors, token).await
    }

    /// Sequential processor over the unsettled items of `intent`.
    async fn process(
        &self,
        intent: &mut SyncIntent,
        errors: &mut Vec<SyncItemError>,
        token: &CancellationToken,
    ) -> Result<SyncState> {
        let queue = intent.remaining();
        if !queue.is_empty() {
            self.state.publish(self.snapshot(intent, SyncStatus::Syncing, errors, None));
        }

        let mut retry_delay = self.config.network_retry_delay;

        for item in queue {
            loop {
                if token.is_cancelled() {
                    return Ok(self.finish_cancelled(intent, errors).await);
                }

                if !self.connectivity.is_online() {
                    info!(batch_id = %intent.batch_id, subject_id = %item.subject_id, "Offline, pausing sync");
                    self.state.publish(self.snapshot(
                        intent,
                        SyncStatus::Paused,
                        errors,
                        Some(&item.subject_id),
                    ));

                    tokio::select! {
                        () = token.cancelled() => {
                            return Ok(self.finish_cancelled(intent, errors).await);
                        }
                        () = self.connectivity.wait_until_online() => {}
                    }

                    info!(batch_id = %intent.batch_id, "Back online, resuming sync");
                    continue;
                }

                self.state.publish(self.snapshot(
                    intent,
                    SyncStatus::Syncing,
                    errors,
                    Some(&item.subject_id),
                ));

                match self.download(&item).await {
                    Ok(document) => match self.store.put_document(&document).await {
                        Ok(()) => {
                            // Mirrors the durable write; terminal paths rebuild from the store.
                            self.cache_index.insert(&item.subject_id);
                            intent.mark_completed(&item.subject_id);
                            retry_delay = self.config.network_retry_delay;
                            debug!(
                                batch_id = %intent.batch_id,
                                subject_id = %item.subject_id,
                                size_bytes = document.size_bytes,
                                "Document cached"
                            );
                        }
                        Err(err) => {
                            self.record_failure(
                                intent,
                                errors,
                                &item,
                                format!("Failed to store document: {err}"),
                            );
                        }
                    },
                    Err(err) if err.is_network_loss() => {
                        if !self.connectivity.is_online() {
                            continue;
                        }

                        warn!(
                            batch_id = %intent.batch_id,
                            subject_id = %item.subject_id,
                            error = %err,
                            retry_in_ms = u64::try_from(retry_delay.as_millis()).unwrap_or(u64::MAX),
                            "Network failure while online, retrying item"
                        );
                        self.state.publish(self.snapshot(
                            intent,
                            SyncStatus::Paused,
                            errors,
                            Some(&item.subject_id),
                        ));

                        tokio::select! {
                            () = token.cancelled() => {
                                return Ok(self.finish_cancelled(intent, errors).await);
                            }
                            () = tokio::time::sleep(retry_delay) => {}
                            () = self.connectivity.changed() => {}
                        }

                        retry_delay = self.config.next_retry_delay(retry_delay);
                        continue;
                    }
                    Err(err) => self.record_failure(intent, errors, &item, err.to_string()),
                }

                // Progress is durable before the next item is fetched.
                if let Err(err) = self.persist(intent, SyncStatus::Syncing).await {
                    return Err(self.abort(intent, errors, err).await);
                }
                break;
            }
        }

        self.finish_completed(intent, errors).await
    }

    async fn download(&self, item: &SyncItem) -> std::result::Result<CachedDocument, FetchError> {
        let fetched =
            tokio::time::timeout(self.config.fetch_timeout, self.fetcher.fetch(&item.source_url))
                .await;

        let body = match fetched {
            Ok(result) => result?,
            Err(_) => {
                return Err(FetchError::Timeout(
                    u64::try_from(self.config.fetch_timeout.as_millis()).unwrap_or(u64::MAX),
                ));
            }
        };

        if body.is_empty() {
            return Err(FetchError::Content("empty document".to_string()));
        }

        Ok(CachedDocument::ready(
            item.subject_id.clone(),
            item.display_name.clone(),
            body,
            Utc::now(),
        ))
    }

    /// Ids of batch items whose cached copy is usable and at least as new
    /// as the remote one.
    async fn already_fresh(&self, intent: &SyncIntent) -> Vec<String> {
        let summaries = match self.store.list_summaries().await {
            Ok(summaries) => summaries,
            Err(err) => {
                warn!(batch_id = %intent.batch_id, error = %err, "Failed to list cached documents; queueing every item");
                return Vec::new();
            }
        };

        let by_id: HashMap<&str, &DocumentSummary> =
            summaries.iter().map(|s| (s.subject_id.as_str(), s)).collect();

        intent
            .items
            .iter()
            .filter(|item| {
                by_id.get(item.subject_id.as_str()).is_some_and(|summary| {
                    summary.is_structurally_valid()
                        && summary.downloaded_at >= item.remote_modified_at
                })
            })
            .map(|item| item.subject_id.clone())
            .collect()
    }

    fn record_failure(
        &self,
        intent: &mut SyncIntent,
        errors: &mut Vec<SyncItemError>,
        item: &SyncItem,
        message: String,
    ) {
        warn!(batch_id = %intent.batch_id, subject_id = %item.subject_id, error = %message, "Item failed");
        intent.mark_failed(&item.subject_id);
        self.push_error(
            errors,
            SyncItemError {
                subject_id: item.subject_id.clone(),
                display_name: item.display_name.clone(),
                message,
            },
        );
    }

    fn push_error(&self, errors: &mut Vec<SyncItemError>, entry: SyncItemError) {
        errors.push(entry);
        let limit = self.config.error_history_limit;
        if errors.len() > limit {
            let excess = errors.len() - limit;
            errors.drain(..excess);
        }
    }

    async fn persist(&self, intent: &SyncIntent, status: SyncStatus) -> Result<()> {
        self.store.put_intent(intent).await?;
        self.write_counters(intent, status).await;
        Ok(())
    }

    async fn write_counters(&self, intent: &SyncIntent, status: SyncStatus) {
        let counters = SessionCounters {
            last_sync_time: Some(Utc::now()),
            total_doctors: saturating_u32(intent.items.len()),
            synced_count: saturating_u32(intent.completed_ids.len()),
            failed_count: saturating_u32(intent.failed_ids.len()),
            status,
        };

        if let Err(err) = self.store.put_counters(&counters).await {
            warn!(batch_id = %intent.batch_id, error = %err, "Failed to write session counters");
        }
    }

    async fn finish_completed(
        &self,
        intent: &mut SyncIntent,
        errors: &mut Vec<SyncItemError>,
    ) -> Result<SyncState> {
        intent.status = IntentStatus::Completed;
        if let Err(err) = self.store.put_intent(intent).await {
            return Err(self.abort(intent, errors, err).await);
        }
        // A COMPLETED record is never resumed, so a failed clear is harmless.
        if let Err(err) = self.store.clear_intent().await {
            warn!(batch_id = %intent.batch_id, error = %err, "Failed to clear completed sync intent");
        }
        self.write_counters(intent, SyncStatus::Completed).await;
        self.rebuild_index().await;

        let state = self.snapshot(intent, SyncStatus::Completed, errors, None);
        self.state.publish(state.clone());
        info!(
            batch_id = %intent.batch_id,
            completed = state.completed,
            failed = state.failed,
            "Sync batch completed"
        );
        Ok(state)
    }

    async fn finish_cancelled(&self, intent: &mut SyncIntent, errors: &[SyncItemError]) -> SyncState {
        info!(batch_id = %intent.batch_id, completed = intent.completed_ids.len(), "Sync batch cancelled");
        intent.status = IntentStatus::Cancelled;

        let written = self.store.put_intent(intent).await;
        if let Err(err) = &written {
            warn!(batch_id = %intent.batch_id, error = %err, "Failed to mark sync intent cancelled");
        }
        let cleared = self.store.clear_intent().await;
        if let Err(err) = &cleared {
            warn!(batch_id = %intent.batch_id, error = %err, "Failed to clear cancelled sync intent");
        }
        self.write_counters(intent, SyncStatus::Cancelled).await;
        self.rebuild_index().await;

        let cancelled = self.snapshot(intent, SyncStatus::Cancelled, errors, None);
        self.state.publish(cancelled.clone());

        // Both writes failed: the durable record is still ACTIVE.
        let still_pending = written.is_err() && cleared.is_err();
        let pending_count = if still_pending { intent.remaining_count() } else { 0 };
        self.state.publish(SyncState {
            has_pending_resume: pending_count > 0,
            pending_count,
            ..SyncState::idle()
        });

        cancelled
    }

    async fn cancel_persisted(&self) -> Result<()> {
        let Some(mut intent) = self.load_intent().await? else {
            debug!("Nothing to cancel");
            return Ok(());
        };

        if !intent.is_active() {
            self.store.clear_intent().await?;
            self.apply_pending(None);
            return Ok(());
        }

        self.finish_cancelled(&mut intent, &[]).await;
        Ok(())
    }

    /// Move the batch into ERROR after a failed intent write.
    async fn abort(
        &self,
        intent: &SyncIntent,
        errors: &mut Vec<SyncItemError>,
        err: DocSyncError,
    ) -> DocSyncError {
        error!(batch_id = %intent.batch_id, error = %err, "Failed to persist sync progress; aborting batch");
        self.push_error(
            errors,
            SyncItemError {
                subject_id: intent.batch_id.clone(),
                display_name: "sync batch".to_string(),
                message: format!("Failed to persist sync progress: {err}"),
            },
        );
        self.write_counters(intent, SyncStatus::Error).await;
        self.rebuild_index().await;
        self.state.publish(self.snapshot(intent, SyncStatus::Error, errors, None));

        match self.pending_resume().await {
            Ok(pending) => self.apply_pending(pending),
            Err(read_err) => {
                warn!(error = %read_err, "Failed to read sync intent after abort");
            }
        }
        err
    }

    async fn rebuild_index(&self) {
        match self.store.list_summaries().await {
            Ok(summaries) => self.cache_index.rebuild(
                summaries
                    .into_iter()
                    .filter(DocumentSummary::is_structurally_valid)
                    .map(|summary| summary.subject_id),
            ),
            Err(err) => warn!(error = %err, "Failed to rebuild cache index"),
        }
    }

    /// Read the intent, discarding a record whose ledgers are inconsistent.
    async fn load_intent(&self) -> Result<Option<SyncIntent>> {
        let Some(intent) = self.store.get_intent().await? else {
            return Ok(None);
        };

        if let Err(err) = intent.validate() {
            warn!(error = %err, "Discarding inconsistent sync intent");
            self.store.clear_intent().await?;
            return Ok(None);
        }
        Ok(Some(intent))
    }

    async fn pending_resume(&self) -> Result<Option<PendingResume>> {
        Ok(self
            .load_intent()
            .await?
            .filter(SyncIntent::is_active)
            .map(|intent| intent.remaining_count())
            .filter(|&pending_count| pending_count > 0)
            .map(|pending_count| PendingResume { pending_count }))
    }

    fn apply_pending(&self, pending: Option<PendingResume>) {
        if self.state.current().status.is_running() {
            return;
        }
        self.state.update(|state| {
            state.has_pending_resume = pending.is_some();
            state.pending_count = pending.map_or(0, |p| p.pending_count);
        });
    }

    fn snapshot(
        &self,
        intent: &SyncIntent,
        status: SyncStatus,
        errors: &[SyncItemError],
        current_item: Option<&str>,
    ) -> SyncState {
        SyncState {
            status,
            total: intent.items.len(),
            completed: intent.completed_ids.len(),
            failed: intent.failed_ids.len(),
            errors: errors.to_vec(),
            has_pending_resume: false,
            pending_count: 0,
            current_item: current_item.map(str::to_string),
        }
    }

    /// Token for the batch about to run. Must be called with the run lock
    /// held so a cancel aimed at an earlier batch cannot reach it.
    fn fresh_token(&self) -> CancellationToken {
        let mut token = self.cancel_token.lock();
        *token = CancellationToken::new();
        token.clone()
    }
}

fn already_running() -> DocSyncError {
    DocSyncError::InvalidState("A sync batch is already running".to_string())
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
