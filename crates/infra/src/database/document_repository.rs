//! SQLite implementation of the document store port.

use std::sync::Arc;

use async_trait::async_trait;
use docsync_common::storage::SqliteConnection;
use docsync_core::DocumentStore;
use docsync_domain::{CachedDocument, DocumentState, DocumentSummary, Result};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;

use super::columns::{
    datetime_to_ms, i64_to_u64, ms_to_datetime, opt_ms_to_datetime, parse_status, u64_to_i64,
};
use super::manager::{map_join_error, map_sql_error, DbManager};

const DOCUMENT_COLUMNS: &str = "subject_id, display_name, blob, size_bytes, downloaded_at_ms, \
                                state, last_sync_attempt_ms";

const SUMMARY_COLUMNS: &str = "subject_id, display_name, size_bytes, length(blob), \
                               downloaded_at_ms, state, last_sync_attempt_ms";

const UPSERT_SQL: &str = "INSERT INTO cached_documents (subject_id, display_name, blob, \
     size_bytes, downloaded_at_ms, state, last_sync_attempt_ms)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
     ON CONFLICT(subject_id) DO UPDATE SET
        display_name = excluded.display_name,
        blob = excluded.blob,
        size_bytes = excluded.size_bytes,
        downloaded_at_ms = excluded.downloaded_at_ms,
        state = excluded.state,
        last_sync_attempt_ms = excluded.last_sync_attempt_ms";

/// SQLite-backed cached document repository.
pub struct SqliteDocumentRepository {
    db: Arc<DbManager>,
}

impl SqliteDocumentRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn upsert(conn: &SqliteConnection, document: &CachedDocument) -> Result<()> {
        conn.execute(
            UPSERT_SQL,
            params![
                document.subject_id,
                document.display_name,
                document.blob,
                u64_to_i64(document.size_bytes),
                datetime_to_ms(document.downloaded_at),
                document.state.as_str(),
                document.last_sync_attempt.map(datetime_to_ms),
            ],
        )
        .map_err(map_sql_error)?;
        Ok(())
    }

    fn select_one(conn: &SqliteConnection, subject_id: &str) -> Result<Option<CachedDocument>> {
        let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM cached_documents WHERE subject_id = ?1");
        conn.query_row(&sql, params![subject_id], map_document_row)
            .optional()
            .map_err(map_sql_error)
    }

    fn select_all(conn: &SqliteConnection) -> Result<Vec<CachedDocument>> {
        let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM cached_documents ORDER BY subject_id");
        let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
        let rows = stmt.query_map([], map_document_row).map_err(map_sql_error)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
    }

    fn select_summaries(
        conn: &SqliteConnection,
        subject_id: Option<&str>,
    ) -> Result<Vec<DocumentSummary>> {
        let sql = match subject_id {
            Some(_) => {
                format!("SELECT {SUMMARY_COLUMNS} FROM cached_documents WHERE subject_id = ?1")
            }
            None => format!("SELECT {SUMMARY_COLUMNS} FROM cached_documents ORDER BY subject_id"),
        };
        let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
        let rows = match subject_id {
            Some(id) => stmt.query_map(params![id], map_summary_row),
            None => stmt.query_map([], map_summary_row),
        }
        .map_err(map_sql_error)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentRepository {
    async fn put_document(&self, document: &CachedDocument) -> Result<()> {
        let db = Arc::clone(&self.db);
        let document = document.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            Self::upsert(&conn, &document)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_document(&self, subject_id: &str) -> Result<Option<CachedDocument>> {
        let db = Arc::clone(&self.db);
        let subject_id = subject_id.to_string();

        task::spawn_blocking(move || -> Result<Option<CachedDocument>> {
            let conn = db.get_connection()?;
            Self::select_one(&conn, &subject_id)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete_document(&self, subject_id: &str) -> Result<bool> {
        let db = Arc::clone(&self.db);
        let subject_id = subject_id.to_string();

        task::spawn_blocking(move || -> Result<bool> {
            let conn = db.get_connection()?;
            let removed = conn
                .execute("DELETE FROM cached_documents WHERE subject_id = ?1", params![subject_id])
                .map_err(map_sql_error)?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_documents(&self) -> Result<Vec<CachedDocument>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<CachedDocument>> {
            let conn = db.get_connection()?;
            Self::select_all(&conn)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_summaries(&self) -> Result<Vec<DocumentSummary>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<DocumentSummary>> {
            let conn = db.get_connection()?;
            Self::select_summaries(&conn, None)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_summary(&self, subject_id: &str) -> Result<Option<DocumentSummary>> {
        let db = Arc::clone(&self.db);
        let subject_id = subject_id.to_string();

        task::spawn_blocking(move || -> Result<Option<DocumentSummary>> {
            let conn = db.get_connection()?;
            Ok(Self::select_summaries(&conn, Some(&subject_id))?.into_iter().next())
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_document_row(row: &Row<'_>) -> rusqlite::Result<CachedDocument> {
    let state: String = row.get(5)?;

    Ok(CachedDocument {
        subject_id: row.get(0)?,
        display_name: row.get(1)?,
        blob: row.get(2)?,
        size_bytes: i64_to_u64(3, row.get(3)?)?,
        downloaded_at: ms_to_datetime(4, row.get(4)?)?,
        state: parse_status::<DocumentState>(5, &state)?,
        last_sync_attempt: opt_ms_to_datetime(6, row.get(6)?)?,
    })
}

fn map_summary_row(row: &Row<'_>) -> rusqlite::Result<DocumentSummary> {
    let state: String = row.get(5)?;

    Ok(DocumentSummary {
        subject_id: row.get(0)?,
        display_name: row.get(1)?,
        size_bytes: i64_to_u64(2, row.get(2)?)?,
        blob_len: i64_to_u64(3, row.get(3)?)?,
        downloaded_at: ms_to_datetime(4, row.get(4)?)?,
        state: parse_status::<DocumentState>(5, &state)?,
        last_sync_attempt: opt_ms_to_datetime(6, row.get(6)?)?,
    })
}
