use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use docsync_core::{CountersStore, DocumentStore, IntentStore, LocalStore};
use docsync_domain::{
    CachedDocument, DocSyncError, DocumentSummary, Result as DomainResult, SessionCounters,
    SyncIntent,
};

use super::EventLog;

#[derive(Default)]
struct State {
    open: bool,
    documents: BTreeMap<String, CachedDocument>,
    intent: Option<SyncIntent>,
    counters: Option<SessionCounters>,
    intent_writes: usize,
    fail_intent_writes_from: Option<usize>,
    failing_documents: HashSet<String>,
    open_error: Option<DocSyncError>,
    probe_error: Option<DocSyncError>,
    resets: usize,
}

/// In-memory local store with failure injection
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    events: EventLog,
}

impl InMemoryStore {
    pub fn with_events(events: EventLog) -> Self {
        Self { state: Mutex::new(State::default()), events }
    }

    fn log(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn seed_document(&self, document: CachedDocument) {
        self.state.lock().unwrap().documents.insert(document.subject_id.clone(), document);
    }

    pub fn seed_intent(&self, intent: SyncIntent) {
        self.state.lock().unwrap().intent = Some(intent);
    }

    pub fn intent(&self) -> Option<SyncIntent> {
        self.state.lock().unwrap().intent.clone()
    }

    pub fn document(&self, subject_id: &str) -> Option<CachedDocument> {
        self.state.lock().unwrap().documents.get(subject_id).cloned()
    }

    pub fn document_count(&self) -> usize {
        self.state.lock().unwrap().documents.len()
    }

    pub fn counters(&self) -> Option<SessionCounters> {
        self.state.lock().unwrap().counters.clone()
    }

    /// Fail the `n`-th intent write (1-based) and every later one
    pub fn fail_intent_writes_from(&self, n: usize) {
        self.state.lock().unwrap().fail_intent_writes_from = Some(n);
    }

    pub fn heal_intent_writes(&self) {
        self.state.lock().unwrap().fail_intent_writes_from = None;
    }

    pub fn fail_document_put(&self, subject_id: &str) {
        self.state.lock().unwrap().failing_documents.insert(subject_id.to_string());
    }

    pub fn fail_open(&self, err: DocSyncError) {
        self.state.lock().unwrap().open_error = Some(err);
    }

    pub fn fail_probe(&self, err: DocSyncError) {
        self.state.lock().unwrap().probe_error = Some(err);
    }

    pub fn resets(&self) -> usize {
        self.state.lock().unwrap().resets
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn put_document(&self, document: &CachedDocument) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.failing_documents.contains(&document.subject_id) {
            return Err(DocSyncError::Database("disk full".to_string()));
        }
        state.documents.insert(document.subject_id.clone(), document.clone());
        drop(state);
        self.log(format!("document:{}", document.subject_id));
        Ok(())
    }

    async fn get_document(&self, subject_id: &str) -> DomainResult<Option<CachedDocument>> {
        Ok(self.document(subject_id))
    }

    async fn delete_document(&self, subject_id: &str) -> DomainResult<bool> {
        Ok(self.state.lock().unwrap().documents.remove(subject_id).is_some())
    }

    async fn list_documents(&self) -> DomainResult<Vec<CachedDocument>> {
        Ok(self.state.lock().unwrap().documents.values().cloned().collect())
    }

    async fn list_summaries(&self) -> DomainResult<Vec<DocumentSummary>> {
        Ok(self.state.lock().unwrap().documents.values().map(CachedDocument::summary).collect())
    }

    async fn get_summary(&self, subject_id: &str) -> DomainResult<Option<DocumentSummary>> {
        Ok(self.document(subject_id).map(|d| d.summary()))
    }
}

#[async_trait]
impl IntentStore for InMemoryStore {
    async fn get_intent(&self) -> DomainResult<Option<SyncIntent>> {
        Ok(self.intent())
    }

    async fn put_intent(&self, intent: &SyncIntent) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        state.intent_writes += 1;
        if state.fail_intent_writes_from.is_some_and(|n| state.intent_writes >= n) {
            return Err(DocSyncError::Database("intent write failed".to_string()));
        }
        state.intent = Some(intent.clone());
        drop(state);
        self.log(format!(
            "intent:{}:{}/{}",
            intent.status,
            intent.completed_ids.len(),
            intent.failed_ids.len()
        ));
        Ok(())
    }

    async fn clear_intent(&self) -> DomainResult<()> {
        self.state.lock().unwrap().intent = None;
        self.log("intent:cleared");
        Ok(())
    }
}

#[async_trait]
impl CountersStore for InMemoryStore {
    async fn get_counters(&self) -> DomainResult<Option<SessionCounters>> {
        Ok(self.counters())
    }

    async fn put_counters(&self, counters: &SessionCounters) -> DomainResult<()> {
        self.state.lock().unwrap().counters = Some(counters.clone());
        Ok(())
    }
}

#[async_trait]
impl LocalStore for InMemoryStore {
    async fn open(&self) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.open_error.clone() {
            return Err(err);
        }
        state.open = true;
        Ok(())
    }

    async fn probe(&self) -> DomainResult<()> {
        match self.state.lock().unwrap().probe_error.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn reset(&self) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        state.documents.clear();
        state.intent = None;
        state.counters = None;
        state.resets += 1;
        state.open = true;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state.lock().unwrap().open
    }
}
