//! SQLite implementation of the intent store port.
//!
//! The intent is one JSON payload under a fixed key, so each checkpoint is a
//! single-row upsert.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use docsync_common::storage::SqliteConnection;
use docsync_core::IntentStore;
use docsync_domain::constants::INTENT_KEY;
use docsync_domain::{DocSyncError, Result, SyncIntent};
use rusqlite::{params, OptionalExtension};
use tokio::task;
use tracing::warn;

use super::manager::{map_join_error, map_sql_error, DbManager};

/// SQLite-backed sync intent repository.
pub struct SqliteIntentRepository {
    db: Arc<DbManager>,
}

impl SqliteIntentRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn read(conn: &SqliteConnection) -> Result<Option<SyncIntent>> {
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload_json FROM sync_intent WHERE id = ?1",
                params![INTENT_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(map_sql_error)?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        match serde_json::from_str::<SyncIntent>(&payload) {
            Ok(intent) => Ok(Some(intent)),
            Err(err) => {
                // An unreadable intent cannot be resumed; drop it so the next
                // batch starts clean.
                warn!(error = %err, "discarding undecodable sync intent");
                Self::delete(conn)?;
                Ok(None)
            }
        }
    }

    fn write(conn: &SqliteConnection, intent: &SyncIntent) -> Result<()> {
        let payload = serde_json::to_string(intent)
            .map_err(|e| DocSyncError::Internal(format!("failed to encode sync intent: {e}")))?;

        conn.execute(
            "INSERT INTO sync_intent (id, payload_json, updated_at_ms) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                payload_json = excluded.payload_json,
                updated_at_ms = excluded.updated_at_ms",
            params![INTENT_KEY, payload, Utc::now().timestamp_millis()],
        )
        .map_err(map_sql_error)?;
        Ok(())
    }

    fn delete(conn: &SqliteConnection) -> Result<()> {
        conn.execute("DELETE FROM sync_intent WHERE id = ?1", params![INTENT_KEY])
            .map_err(map_sql_error)?;
        Ok(())
    }
}

#[async_trait]
impl IntentStore for SqliteIntentRepository {
    async fn get_intent(&self) -> Result<Option<SyncIntent>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Option<SyncIntent>> {
            let conn = db.get_connection()?;
            Self::read(&conn)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn put_intent(&self, intent: &SyncIntent) -> Result<()> {
        let db = Arc::clone(&self.db);
        let intent = intent.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            Self::write(&conn, &intent)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn clear_intent(&self) -> Result<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            Self::delete(&conn)
        })
        .await
        .map_err(map_join_error)?
    }
}
