//! Shared test helpers for `docsync-core` integration tests.
//!
//! In-memory fakes for every core port plus a harness that wires them into
//! a [`SyncOrchestrator`], so scenario tests can focus on behaviour.
#![allow(dead_code)]

pub mod catalog;
pub mod connectivity;
pub mod fetcher;
pub mod store;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use docsync_core::{CacheIndex, OrchestratorConfig, SyncOrchestrator};
use docsync_domain::{SyncItem, SyncState, SyncStatus};
use tokio::sync::watch;

pub use catalog::StaticCatalog;
pub use connectivity::FakeConnectivity;
pub use fetcher::{Response, ScriptedFetcher};
pub use store::InMemoryStore;

/// Ordered record of store writes and fetches shared by the fakes
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn url(subject_id: &str) -> String {
    format!("https://cdn.example.test/{subject_id}.pdf")
}

pub fn at(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).unwrap()
}

pub fn item(subject_id: &str, modified_ms: i64) -> SyncItem {
    SyncItem {
        subject_id: subject_id.to_string(),
        display_name: format!("Dr. {subject_id}"),
        source_url: url(subject_id),
        remote_modified_at: at(modified_ms),
    }
}

pub fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig {
        fetch_timeout: Duration::from_secs(5),
        network_retry_delay: Duration::from_millis(10),
        max_network_retry_delay: Duration::from_millis(40),
        error_history_limit: 50,
    }
}

/// Orchestrator wired to in-memory fakes
pub struct Harness {
    pub events: EventLog,
    pub store: Arc<InMemoryStore>,
    pub fetcher: Arc<ScriptedFetcher>,
    pub connectivity: Arc<FakeConnectivity>,
    pub index: Arc<CacheIndex>,
    pub orchestrator: Arc<SyncOrchestrator>,
}

impl Harness {
    pub fn new() -> Self {
        let events = EventLog::default();
        Self::with_store(Arc::new(InMemoryStore::with_events(Arc::clone(&events))), events)
    }

    /// A fresh orchestrator over an existing store, as after a restart.
    pub fn with_store(store: Arc<InMemoryStore>, events: EventLog) -> Self {
        Self::build(store, events, fast_config())
    }

    pub fn build(store: Arc<InMemoryStore>, events: EventLog, config: OrchestratorConfig) -> Self {
        let fetcher = Arc::new(ScriptedFetcher::with_events(Arc::clone(&events)));
        let connectivity = Arc::new(FakeConnectivity::new(true));
        let index = Arc::new(CacheIndex::new());
        let orchestrator = Arc::new(SyncOrchestrator::new(
            store.clone(),
            fetcher.clone(),
            connectivity.clone(),
            Arc::clone(&index),
            config,
        ));

        Self { events, store, fetcher, connectivity, index, orchestrator }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Record every published status
    pub fn record_statuses(&self) -> (Arc<Mutex<Vec<SyncStatus>>>, docsync_core::Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription =
            self.orchestrator.subscribe(move |state: &SyncState| sink.lock().unwrap().push(state.status));
        (seen, subscription)
    }
}

/// Wait until a published snapshot satisfies `predicate`
pub async fn wait_for_state<F>(rx: &mut watch::Receiver<SyncState>, predicate: F) -> SyncState
where
    F: Fn(&SyncState) -> bool,
{
    tokio::time::timeout(Duration::from_secs(10), rx.wait_for(|state| predicate(state)))
        .await
        .expect("timed out waiting for sync state")
        .expect("state channel closed")
        .clone()
}
