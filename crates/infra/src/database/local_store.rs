//! SQLite-backed local store
//!
//! Combines the three record-family repositories behind one lazily opened
//! database handle and owns the open/reset recovery path:
//!
//! - A recoverable open failure (corruption, schema drift) deletes the
//!   database file with its `-wal`/`-shm` side files and opens once more.
//! - A fatal open failure (access denial, read-only media) is returned as
//!   [`DocSyncError::StorageUnavailable`] with `recoverable: false`.
//! - An operation that hits corruption after a successful open drops the
//!   handle so the next operation goes through the open path again.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use docsync_common::storage::{StorageError, StorageRecovery};
use docsync_core::{CountersStore, DocumentStore, IntentStore, LocalStore};
use docsync_domain::{
    CachedDocument, DatabaseConfig, DocSyncError, DocumentSummary, Result, SessionCounters,
    SyncIntent,
};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, info, instrument, warn};

use super::counters_repository::SqliteCountersRepository;
use super::document_repository::SqliteDocumentRepository;
use super::intent_repository::SqliteIntentRepository;
use super::manager::{map_join_error, DbManager};

/// Local store over a single SQLite file.
pub struct SqliteLocalStore {
    path: PathBuf,
    pool_size: u32,
    db: RwLock<Option<Arc<DbManager>>>,
    open_lock: Mutex<()>,
}

impl SqliteLocalStore {
    /// Create an unopened store; the file is touched on first use.
    pub fn new(path: impl Into<PathBuf>, pool_size: u32) -> Self {
        Self { path: path.into(), pool_size, db: RwLock::new(None), open_lock: Mutex::new(()) }
    }

    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(&config.path, config.pool_size)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn manager(&self) -> Result<Arc<DbManager>> {
        let current = self.db.read().clone();
        if let Some(db) = current {
            return Ok(db);
        }

        self.open().await?;
        self.db
            .read()
            .clone()
            .ok_or_else(|| DocSyncError::Internal("store closed while opening".into()))
    }

    async fn documents(&self) -> Result<SqliteDocumentRepository> {
        Ok(SqliteDocumentRepository::new(self.manager().await?))
    }

    async fn intents(&self) -> Result<SqliteIntentRepository> {
        Ok(SqliteIntentRepository::new(self.manager().await?))
    }

    async fn counters(&self) -> Result<SqliteCountersRepository> {
        Ok(SqliteCountersRepository::new(self.manager().await?))
    }

    /// Drop the handle after corruption surfaced mid-operation.
    fn check<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_recoverable_storage() && self.db.write().take().is_some() {
                warn!(db_path = %self.path.display(), error = %err, "closing damaged store");
            }
        }
        result
    }
}

#[async_trait]
impl DocumentStore for SqliteLocalStore {
    async fn put_document(&self, document: &CachedDocument) -> Result<()> {
        let result = self.documents().await?.put_document(document).await;
        self.check(result)
    }

    async fn get_document(&self, subject_id: &str) -> Result<Option<CachedDocument>> {
        let result = self.documents().await?.get_document(subject_id).await;
        self.check(result)
    }

    async fn delete_document(&self, subject_id: &str) -> Result<bool> {
        let result = self.documents().await?.delete_document(subject_id).await;
        self.check(result)
    }

    async fn list_documents(&self) -> Result<Vec<CachedDocument>> {
        let result = self.documents().await?.list_documents().await;
        self.check(result)
    }

    async fn list_summaries(&self) -> Result<Vec<DocumentSummary>> {
        let result = self.documents().await?.list_summaries().await;
        self.check(result)
    }

    async fn get_summary(&self, subject_id: &str) -> Result<Option<DocumentSummary>> {
        let result = self.documents().await?.get_summary(subject_id).await;
        self.check(result)
    }
}

#[async_trait]
impl IntentStore for SqliteLocalStore {
    async fn get_intent(&self) -> Result<Option<SyncIntent>> {
        let result = self.intents().await?.get_intent().await;
        self.check(result)
    }

    async fn put_intent(&self, intent: &SyncIntent) -> Result<()> {
        let result = self.intents().await?.put_intent(intent).await;
        self.check(result)
    }

    async fn clear_intent(&self) -> Result<()> {
        let result = self.intents().await?.clear_intent().await;
        self.check(result)
    }
}

#[async_trait]
impl CountersStore for SqliteLocalStore {
    async fn get_counters(&self) -> Result<Option<SessionCounters>> {
        let result = self.counters().await?.get_counters().await;
        self.check(result)
    }

    async fn put_counters(&self, counters: &SessionCounters) -> Result<()> {
        let result = self.counters().await?.put_counters(counters).await;
        self.check(result)
    }
}

#[async_trait]
impl LocalStore for SqliteLocalStore {
    #[instrument(skip(self), fields(db_path = %self.path.display()))]
    async fn open(&self) -> Result<()> {
        let _guard = self.open_lock.lock().await;
        if self.is_open() {
            return Ok(());
        }

        let path = self.path.clone();
        let pool_size = self.pool_size;
        let manager = task::spawn_blocking(move || open_with_recovery(&path, pool_size))
            .await
            .map_err(map_join_error)??;

        *self.db.write() = Some(Arc::new(manager));
        debug!("local store open");
        Ok(())
    }

    async fn probe(&self) -> Result<()> {
        let db = self.manager().await?;
        let result = task::spawn_blocking(move || db.probe()).await.map_err(map_join_error)?;
        self.check(result)
    }

    #[instrument(skip(self), fields(db_path = %self.path.display()))]
    async fn reset(&self) -> Result<()> {
        let _guard = self.open_lock.lock().await;
        drop(self.db.write().take());

        let path = self.path.clone();
        let pool_size = self.pool_size;
        let manager = task::spawn_blocking(move || -> Result<DbManager> {
            remove_database_files(&path)?;
            DbManager::open(&path, pool_size).map_err(open_failure)
        })
        .await
        .map_err(map_join_error)??;

        *self.db.write() = Some(Arc::new(manager));
        info!("local store reset");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.db.read().is_some()
    }
}

fn open_with_recovery(path: &Path, pool_size: u32) -> Result<DbManager> {
    match DbManager::open(path, pool_size) {
        Ok(manager) => Ok(manager),
        Err(err) if err.recovery() == StorageRecovery::Recoverable => {
            warn!(db_path = %path.display(), error = %err, "database unusable, rebuilding store");
            remove_database_files(path)?;
            DbManager::open(path, pool_size).map_err(open_failure)
        }
        Err(err) => {
            warn!(db_path = %path.display(), error = %err, "database cannot be opened");
            Err(open_failure(err))
        }
    }
}

/// Classify an open failure by its recovery class.
fn open_failure(err: StorageError) -> DocSyncError {
    let message = err.to_string();
    match err.recovery() {
        StorageRecovery::Recoverable => DocSyncError::StorageUnavailable { recoverable: true, message },
        StorageRecovery::Fatal => DocSyncError::StorageUnavailable { recoverable: false, message },
        StorageRecovery::Transient => DocSyncError::Database(message),
    }
}

fn remove_database_files(path: &Path) -> Result<()> {
    let mut targets = vec![path.to_path_buf()];
    for suffix in ["-wal", "-shm"] {
        let mut side = path.as_os_str().to_owned();
        side.push(suffix);
        targets.push(PathBuf::from(side));
    }

    for target in targets {
        match std::fs::remove_file(&target) {
            Ok(()) => debug!(path = %target.display(), "removed database file"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(DocSyncError::StorageUnavailable {
                    recoverable: false,
                    message: format!("failed to remove {}: {err}", target.display()),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn side_files_are_removed_with_the_database() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("store.db");
        for name in ["store.db", "store.db-wal", "store.db-shm"] {
            std::fs::write(temp_dir.path().join(name), b"x").unwrap();
        }

        remove_database_files(&db_path).unwrap();

        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
        remove_database_files(&db_path).expect("missing files are ignored");
    }

    #[tokio::test]
    async fn operations_open_lazily() {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteLocalStore::new(temp_dir.path().join("lazy.db"), 2);
        assert!(!store.is_open());

        assert!(store.get_intent().await.unwrap().is_none());

        assert!(store.is_open());
    }
}
