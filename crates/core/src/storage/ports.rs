//! Port interfaces for the local store
//!
//! The local store is the single choke-point for durable state. Every write
//! is a single-record upsert so it either lands completely or not at all.

use async_trait::async_trait;
use docsync_domain::{CachedDocument, DocumentSummary, Result, SessionCounters, SyncIntent};

/// Keyed access to cached binary documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert or replace a document
    async fn put_document(&self, document: &CachedDocument) -> Result<()>;

    /// Get a document with its body
    async fn get_document(&self, subject_id: &str) -> Result<Option<CachedDocument>>;

    /// Delete a document; returns false when it did not exist
    async fn delete_document(&self, subject_id: &str) -> Result<bool>;

    /// List every document with its body
    async fn list_documents(&self) -> Result<Vec<CachedDocument>>;

    /// List metadata of every document without loading bodies
    async fn list_summaries(&self) -> Result<Vec<DocumentSummary>>;

    /// Get metadata of one document
    async fn get_summary(&self, subject_id: &str) -> Result<Option<DocumentSummary>>;
}

/// Single-record access to the current sync intent
#[async_trait]
pub trait IntentStore: Send + Sync {
    async fn get_intent(&self) -> Result<Option<SyncIntent>>;

    async fn put_intent(&self, intent: &SyncIntent) -> Result<()>;

    async fn clear_intent(&self) -> Result<()>;
}

/// Single-record access to the last-run counters
#[async_trait]
pub trait CountersStore: Send + Sync {
    async fn get_counters(&self) -> Result<Option<SessionCounters>>;

    async fn put_counters(&self, counters: &SessionCounters) -> Result<()>;
}

/// The full local store with its lifecycle
///
/// Implementations open lazily: every record operation on an unopened store
/// opens it first. A recoverable open failure resets the store once and
/// retries; fatal failures are returned as
/// [`DocSyncError::StorageUnavailable`](docsync_domain::DocSyncError) with
/// `recoverable: false`.
#[async_trait]
pub trait LocalStore: DocumentStore + IntentStore + CountersStore {
    /// Open the store, running the recovery path on failure
    async fn open(&self) -> Result<()>;

    /// Verify every record family can be read
    async fn probe(&self) -> Result<()>;

    /// Drop and recreate the entire store
    async fn reset(&self) -> Result<()>;

    fn is_open(&self) -> bool;
}
