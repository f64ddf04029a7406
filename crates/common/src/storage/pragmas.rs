//! SQLite pragma management
//!
//! Applies per-connection pragmas for durability and concurrency.

use rusqlite::Connection;

use super::config::SqlitePoolConfig;
use crate::storage::error::{StorageError, StorageResult};

/// Apply connection-level pragmas
///
/// These pragmas are applied to each connection in the pool:
/// - WAL mode so readers never block the single writer
/// - FULL synchronous mode when durable commits are requested
/// - Foreign key constraints enabled
/// - Busy timeout for handling lock contention
pub fn apply_connection_pragmas(conn: &Connection, config: &SqlitePoolConfig) -> StorageResult<()> {
    let mut pragma_sql = String::new();

    if config.enable_wal {
        pragma_sql.push_str("PRAGMA journal_mode=WAL;\n");
        pragma_sql.push_str("PRAGMA wal_autocheckpoint=1000;\n");
    }

    if config.durable_commits {
        pragma_sql.push_str("PRAGMA synchronous=FULL;\n");
    } else {
        pragma_sql.push_str("PRAGMA synchronous=NORMAL;\n");
    }

    pragma_sql.push_str("PRAGMA foreign_keys=ON;\n");

    conn.execute_batch(&pragma_sql).map_err(StorageError::from)?;

    conn.busy_timeout(config.busy_timeout).map_err(StorageError::from)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    //! Unit tests for storage::pragmas.
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_apply_pragmas() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let conn = Connection::open(db_path).unwrap();
        let config = SqlitePoolConfig::default();

        apply_connection_pragmas(&conn, &config).unwrap();

        let journal_mode: String =
            conn.pragma_query_value(None, "journal_mode", |row| row.get(0)).unwrap();
        assert_eq!(journal_mode.to_lowercase(), "wal");

        let synchronous: i32 =
            conn.pragma_query_value(None, "synchronous", |row| row.get(0)).unwrap();
        assert_eq!(synchronous, 2); // 2 = FULL
    }

    #[test]
    fn test_normal_sync_when_durability_relaxed() {
        let temp_dir = TempDir::new().unwrap();
        let conn = Connection::open(temp_dir.path().join("relaxed.db")).unwrap();
        let config = SqlitePoolConfig { durable_commits: false, ..SqlitePoolConfig::default() };

        apply_connection_pragmas(&conn, &config).unwrap();

        let synchronous: i32 =
            conn.pragma_query_value(None, "synchronous", |row| row.get(0)).unwrap();
        assert_eq!(synchronous, 1); // 1 = NORMAL
    }
}
