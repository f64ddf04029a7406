//! SQLite local store: durability, probing, reset, and the open recovery
//! path.

mod support;

use chrono::Utc;
use docsync_core::{CountersStore, DocumentStore, IntentStore, LocalStore};
use docsync_domain::{DocSyncError, SessionCounters, SyncIntent, SyncItem, SyncStatus};
use docsync_infra::database::SqliteLocalStore;
use support::{at, document, TestDatabase};

fn item(id: &str) -> SyncItem {
    SyncItem {
        subject_id: id.to_string(),
        display_name: format!("Dr. {id}"),
        source_url: format!("https://docs.example/{id}.pdf"),
        remote_modified_at: at(1_000),
    }
}

#[tokio::test]
async fn test_records_survive_a_restart() {
    let db = TestDatabase::new();
    let mut intent = SyncIntent::new("batch-1", vec![item("A"), item("B")], Utc::now());
    intent.mark_completed("A");

    db.store.put_document(&document("A", b"%PDF-A", 10)).await.unwrap();
    db.store.put_intent(&intent).await.unwrap();
    db.store
        .put_counters(&SessionCounters {
            last_sync_time: Some(at(20)),
            total_doctors: 2,
            synced_count: 1,
            failed_count: 0,
            status: SyncStatus::Syncing,
        })
        .await
        .unwrap();

    let restarted = db.reopen();

    assert_eq!(restarted.get_document("A").await.unwrap().unwrap().blob, b"%PDF-A".to_vec());
    assert_eq!(restarted.get_intent().await.unwrap(), Some(intent));
    assert_eq!(restarted.get_counters().await.unwrap().unwrap().synced_count, 1);
}

#[tokio::test]
async fn test_probe_covers_every_record_family() {
    let db = TestDatabase::new();
    db.store.open().await.unwrap();
    db.store.probe().await.unwrap();

    db.execute_batch("DROP TABLE sync_intent;");

    let err = db.store.probe().await.unwrap_err();
    assert!(err.to_string().contains("sync_intent"), "got {err}");
}

#[tokio::test]
async fn test_reset_drops_all_records() {
    let db = TestDatabase::new();
    db.store.put_document(&document("A", b"body", 1)).await.unwrap();
    db.store.put_intent(&SyncIntent::new("b", vec![item("A")], Utc::now())).await.unwrap();

    db.store.reset().await.unwrap();

    assert!(db.store.is_open());
    assert!(db.store.list_documents().await.unwrap().is_empty());
    assert!(db.store.get_intent().await.unwrap().is_none());
    assert!(db.store.get_counters().await.unwrap().is_none());
}

/// A file that is not a database is rebuilt once on open.
#[tokio::test]
async fn test_garbage_file_is_rebuilt_on_open() {
    let db = TestDatabase::new();
    std::fs::write(db.path(), vec![0x5A_u8; 16 * 1024]).unwrap();

    db.store.open().await.expect("recovered by reset");

    assert!(db.store.list_summaries().await.unwrap().is_empty());
    db.store.put_document(&document("A", b"fresh", 1)).await.unwrap();
    assert_eq!(db.store.list_documents().await.unwrap().len(), 1);
}

/// A newer schema version on disk is treated as drift and rebuilt.
#[tokio::test]
async fn test_schema_version_mismatch_is_rebuilt() {
    let db = TestDatabase::new();
    db.store.put_document(&document("A", b"old", 1)).await.unwrap();
    db.execute_batch("INSERT INTO schema_version (version, applied_at) VALUES (42, 0);");

    let restarted = db.reopen();
    restarted.open().await.expect("recovered by reset");

    assert!(restarted.get_document("A").await.unwrap().is_none());
}

/// An unopenable location is fatal and never deleted or retried.
#[tokio::test]
async fn test_unopenable_path_is_fatal() {
    let db = TestDatabase::new();
    let store = SqliteLocalStore::new(db.dir().join("missing-dir").join("docsync.db"), 1);

    let err = store.open().await.unwrap_err();

    assert!(
        matches!(err, DocSyncError::StorageUnavailable { recoverable: false, .. }),
        "got {err:?}"
    );
    assert!(!store.is_open());
    assert!(store.get_intent().await.is_err());
}

#[tokio::test]
async fn test_summaries_skip_bodies_but_flag_invalid_rows() {
    let db = TestDatabase::new();
    db.store.put_document(&document("A", &[1; 64], 1)).await.unwrap();
    db.store.put_document(&document("B", b"", 1)).await.unwrap();

    let summaries = db.store.list_summaries().await.unwrap();

    let valid: Vec<_> = summaries
        .iter()
        .filter(|s| s.is_structurally_valid())
        .map(|s| s.subject_id.as_str())
        .collect();
    assert_eq!(valid, vec!["A"]);
    assert_eq!(summaries.len(), 2);
}
