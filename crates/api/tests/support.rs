#![allow(dead_code)]

use docsync_domain::{Config, DatabaseConfig, SyncConfig};
use docsync_lib::AppContext;
use serde_json::json;
use tempfile::TempDir;

/// Context over a throwaway database and catalog file.
pub struct TestApp {
    pub context: AppContext,
    pub dir: TempDir,
}

/// Write a catalog with one entry per `(subject_id, remote_modified_ms)`
/// pointing at `base_url`.
pub fn write_catalog(dir: &TempDir, base_url: &str, entries: &[(&str, i64)]) -> String {
    let body: Vec<_> = entries
        .iter()
        .map(|(id, modified)| {
            json!({
                "subject_id": id,
                "source_url": format!("{base_url}/docs/{id}.pdf"),
                "remote_modified_at": modified,
            })
        })
        .collect();
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, serde_json::to_vec(&body).expect("catalog json"))
        .expect("catalog file should be written");
    path.to_string_lossy().to_string()
}

pub fn test_config(dir: &TempDir) -> Config {
    Config {
        database: DatabaseConfig {
            path: dir.path().join("docsync.db").to_string_lossy().to_string(),
            pool_size: 2,
        },
        sync: SyncConfig {
            fetch_timeout_ms: 2_000,
            network_retry_delay_ms: 10,
            max_network_retry_delay_ms: 40,
            catalog_path: Some(dir.path().join("catalog.json").to_string_lossy().to_string()),
            ..SyncConfig::default()
        },
        ..Config::default()
    }
}

pub async fn create_test_app() -> TestApp {
    let dir = TempDir::new().expect("failed to create temporary test directory");
    let context = AppContext::new_with_config(test_config(&dir))
        .await
        .expect("AppContext creation should succeed");
    TestApp { context, dir }
}
