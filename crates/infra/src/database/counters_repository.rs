//! SQLite implementation of the session counters port.

use std::sync::Arc;

use async_trait::async_trait;
use docsync_common::storage::SqliteConnection;
use docsync_core::CountersStore;
use docsync_domain::constants::COUNTERS_KEY;
use docsync_domain::{Result, SessionCounters, SyncStatus};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;

use super::columns::{datetime_to_ms, i64_to_u32, opt_ms_to_datetime, parse_status};
use super::manager::{map_join_error, map_sql_error, DbManager};

/// SQLite-backed last-run counters repository.
pub struct SqliteCountersRepository {
    db: Arc<DbManager>,
}

impl SqliteCountersRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn read(conn: &SqliteConnection) -> Result<Option<SessionCounters>> {
        conn.query_row(
            "SELECT last_sync_time_ms, total_doctors, synced_count, failed_count, status
             FROM session_counters WHERE id = ?1",
            params![COUNTERS_KEY],
            map_counters_row,
        )
        .optional()
        .map_err(map_sql_error)
    }

    fn write(conn: &SqliteConnection, counters: &SessionCounters) -> Result<()> {
        conn.execute(
            "INSERT INTO session_counters
                (id, last_sync_time_ms, total_doctors, synced_count, failed_count, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                last_sync_time_ms = excluded.last_sync_time_ms,
                total_doctors = excluded.total_doctors,
                synced_count = excluded.synced_count,
                failed_count = excluded.failed_count,
                status = excluded.status",
            params![
                COUNTERS_KEY,
                counters.last_sync_time.map(datetime_to_ms),
                i64::from(counters.total_doctors),
                i64::from(counters.synced_count),
                i64::from(counters.failed_count),
                counters.status.as_str(),
            ],
        )
        .map_err(map_sql_error)?;
        Ok(())
    }
}

#[async_trait]
impl CountersStore for SqliteCountersRepository {
    async fn get_counters(&self) -> Result<Option<SessionCounters>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Option<SessionCounters>> {
            let conn = db.get_connection()?;
            Self::read(&conn)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn put_counters(&self, counters: &SessionCounters) -> Result<()> {
        let db = Arc::clone(&self.db);
        let counters = counters.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            Self::write(&conn, &counters)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_counters_row(row: &Row<'_>) -> rusqlite::Result<SessionCounters> {
    let status: String = row.get(4)?;

    Ok(SessionCounters {
        last_sync_time: opt_ms_to_datetime(0, row.get(0)?)?,
        total_doctors: i64_to_u32(1, row.get(1)?)?,
        synced_count: i64_to_u32(2, row.get(2)?)?,
        failed_count: i64_to_u32(3, row.get(3)?)?,
        status: parse_status::<SyncStatus>(4, &status)?,
    })
}
