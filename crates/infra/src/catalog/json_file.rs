//! Catalog snapshot read from a local JSON file.
//!
//! The file holds an array of entries:
//!
//! ```json
//! [{ "subject_id": "A", "source_url": "https://...", "remote_modified_at": 1700000000000 }]
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use docsync_core::CatalogSource;
use docsync_domain::{CatalogEntry, DocSyncError, Result};
use tracing::debug;

/// [`CatalogSource`] that re-reads its file on every snapshot.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogSource for JsonFileCatalog {
    async fn snapshot(&self) -> Result<Vec<CatalogEntry>> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DocSyncError::NotFound(format!("catalog file {}", self.path.display()))
            } else {
                DocSyncError::Internal(format!(
                    "failed to read catalog {}: {e}",
                    self.path.display()
                ))
            }
        })?;

        let entries: Vec<CatalogEntry> = serde_json::from_str(&contents)
            .map_err(|e| DocSyncError::InvalidInput(format!("invalid catalog JSON: {e}")))?;

        debug!(path = %self.path.display(), entries = entries.len(), "catalog snapshot loaded");
        Ok(entries)
    }
}
