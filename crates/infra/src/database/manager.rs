//! Database connection manager backed by the shared SQLite pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use docsync_common::storage::{
    SqliteConnection, SqlitePool, SqlitePoolConfig, StorageError, StorageResult,
};
use docsync_domain::constants::SCHEMA_VERSION;
use docsync_domain::{DocSyncError, Result};
use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

use crate::errors::InfraError;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Tables the store reads and writes; each must answer a query for the
/// store to count as accessible.
const RECORD_FAMILIES: [&str; 3] = ["cached_documents", "sync_intent", "session_counters"];

/// Database manager that wraps an [`SqlitePool`].
pub struct DbManager {
    pool: Arc<SqlitePool>,
    path: PathBuf,
}

impl DbManager {
    /// Open the database at `db_path`, creating the file and schema when
    /// needed.
    ///
    /// Errors keep their [`StorageError`] shape so the caller can decide
    /// between a reset and surfacing the failure.
    pub fn open<P: AsRef<Path>>(db_path: P, pool_size: u32) -> StorageResult<Self> {
        let path = db_path.as_ref().to_path_buf();

        let config = SqlitePoolConfig { max_size: pool_size.max(1), ..SqlitePoolConfig::default() };
        let pool = SqlitePool::new(&path, config)?;

        let manager = Self { pool: Arc::new(pool), path };
        manager.run_migrations()?;

        info!(
            db_path = %manager.path.display(),
            max_connections = manager.pool.metrics().max_pool_size(),
            "sqlite pool initialised"
        );

        Ok(manager)
    }

    /// Borrow the underlying pool.
    pub fn pool(&self) -> &Arc<SqlitePool> {
        &self.pool
    }

    /// Acquire a connection from the pool.
    pub fn get_connection(&self) -> Result<SqliteConnection> {
        self.pool.get_connection().map_err(map_storage_error)
    }

    /// Ensure the full schema exists and matches the compiled version.
    pub fn run_migrations(&self) -> StorageResult<()> {
        let conn = self.pool.get_connection()?;
        create_schema(&conn)
    }

    /// Return the configured database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Verify every record family can be read.
    pub fn probe(&self) -> Result<()> {
        let conn = self.get_connection()?;
        for table in RECORD_FAMILIES {
            let sql = format!("SELECT COUNT(*) FROM {table}");
            let rows: i64 =
                conn.query_row(&sql, [], |row| row.get(0)).map_err(map_sql_error)?;
            debug!(table, rows, "record family readable");
        }
        Ok(())
    }
}

fn create_schema(conn: &SqliteConnection) -> StorageResult<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    let stored: Option<i32> = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
        .optional()?
        .flatten();

    match stored {
        Some(found) if found != SCHEMA_VERSION => {
            Err(StorageError::SchemaVersionMismatch { expected: SCHEMA_VERSION, found })
        }
        Some(_) => Ok(()),
        None => {
            conn.execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?1, CAST(strftime('%s','now') AS INTEGER))",
                params![SCHEMA_VERSION],
            )?;
            Ok(())
        }
    }
}

pub(crate) fn map_sql_error(err: rusqlite::Error) -> DocSyncError {
    DocSyncError::from(InfraError::from(err))
}

pub(crate) fn map_storage_error(err: StorageError) -> DocSyncError {
    DocSyncError::from(InfraError::from(err))
}

pub(crate) fn map_join_error(err: tokio::task::JoinError) -> DocSyncError {
    if err.is_cancelled() {
        DocSyncError::Internal("database task cancelled".into())
    } else {
        DocSyncError::Internal(format!("database task panic: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn open_creates_schema_version() {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::open(&db_path, 4).expect("manager created");

        let conn = manager.get_connection().expect("connection acquired");
        let version: i32 =
            conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0)).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn reopen_keeps_single_version_row() {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db_path = temp_dir.path().join("test.db");

        drop(DbManager::open(&db_path, 2).expect("first open"));
        let manager = DbManager::open(&db_path, 2).expect("second open");

        let conn = manager.get_connection().unwrap();
        let rows: i64 =
            conn.query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0)).unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn probe_succeeds_for_fresh_database() {
        let temp_dir = TempDir::new().expect("temp dir created");
        let manager = DbManager::open(temp_dir.path().join("test.db"), 2).unwrap();

        manager.probe().expect("probe passed");
    }

    #[test]
    fn probe_fails_when_a_table_is_missing() {
        let temp_dir = TempDir::new().expect("temp dir created");
        let manager = DbManager::open(temp_dir.path().join("test.db"), 2).unwrap();
        manager.get_connection().unwrap().execute_batch("DROP TABLE session_counters").unwrap();

        let err = manager.probe().unwrap_err();
        assert!(err.to_string().contains("session_counters"), "got {err}");
    }

    #[test]
    fn newer_schema_version_is_a_mismatch() {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db_path = temp_dir.path().join("test.db");
        {
            let manager = DbManager::open(&db_path, 1).unwrap();
            manager
                .get_connection()
                .unwrap()
                .execute("INSERT INTO schema_version (version, applied_at) VALUES (99, 0)", [])
                .unwrap();
        }

        let err = DbManager::open(&db_path, 1).err().expect("mismatch detected");
        assert!(
            matches!(err, StorageError::SchemaVersionMismatch { expected: 1, found: 99 }),
            "got {err:?}"
        );
        assert!(err.is_recoverable());
    }
}
