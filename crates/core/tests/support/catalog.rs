use std::sync::Mutex;

use async_trait::async_trait;
use docsync_core::CatalogSource;
use docsync_domain::{CatalogEntry, Result as DomainResult};

use super::{at, url};

/// Catalog snapshot replaced by the test
#[derive(Default)]
pub struct StaticCatalog {
    entries: Mutex<Vec<CatalogEntry>>,
}

impl StaticCatalog {
    pub fn new(entries: &[(&str, i64)]) -> Self {
        let catalog = Self::default();
        catalog.set(entries);
        catalog
    }

    pub fn set(&self, entries: &[(&str, i64)]) {
        *self.entries.lock().unwrap() = entries
            .iter()
            .map(|(id, modified_ms)| CatalogEntry {
                subject_id: (*id).to_string(),
                display_name: Some(format!("Dr. {id}")),
                source_url: url(id),
                remote_modified_at: at(*modified_ms),
            })
            .collect();
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn snapshot(&self) -> DomainResult<Vec<CatalogEntry>> {
        Ok(self.entries.lock().unwrap().clone())
    }
}
