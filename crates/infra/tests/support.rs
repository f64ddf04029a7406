#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use std::time::Duration;

use chrono::{DateTime, Utc};
use docsync_domain::{CachedDocument, SyncConfig, SyncState};
use docsync_infra::database::SqliteLocalStore;
use tempfile::TempDir;
use tokio::sync::watch;

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness; `RUST_LOG` controls it.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Temporary database directory that outlives every store opened on it.
pub struct TestDatabase {
    pub store: Arc<SqliteLocalStore>,
    path: PathBuf,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        init_tracing();
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let path = temp_dir.path().join("docsync.db");
        let store = Arc::new(SqliteLocalStore::new(&path, 2));
        Self { store, path, _temp_dir: temp_dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self._temp_dir.path()
    }

    /// A second, independent store over the same file, as after a restart.
    pub fn reopen(&self) -> Arc<SqliteLocalStore> {
        Arc::new(SqliteLocalStore::new(&self.path, 2))
    }

    /// Run raw SQL against the file outside the store.
    pub fn execute_batch(&self, sql: &str) {
        let conn = rusqlite::Connection::open(&self.path).expect("raw connection");
        conn.execute_batch(sql).expect("SQL batch execution should succeed");
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

pub fn at(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).expect("valid timestamp")
}

pub fn document(id: &str, body: &[u8], downloaded_ms: i64) -> CachedDocument {
    CachedDocument::ready(id, format!("Dr. {id}"), body.to_vec(), at(downloaded_ms))
}

pub fn fast_sync_config() -> SyncConfig {
    SyncConfig {
        fetch_timeout_ms: 2_000,
        network_retry_delay_ms: 10,
        max_network_retry_delay_ms: 40,
        ..SyncConfig::default()
    }
}

pub async fn wait_for_state<F>(rx: &mut watch::Receiver<SyncState>, predicate: F) -> SyncState
where
    F: FnMut(&SyncState) -> bool,
{
    tokio::time::timeout(Duration::from_secs(10), rx.wait_for(predicate))
        .await
        .expect("state reached in time")
        .expect("orchestrator alive")
        .clone()
}
