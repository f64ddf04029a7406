//! Remote catalog records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::intent::SyncItem;

/// One record of a remote catalog snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub subject_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub source_url: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub remote_modified_at: DateTime<Utc>,
}

impl From<CatalogEntry> for SyncItem {
    fn from(entry: CatalogEntry) -> Self {
        let display_name = entry.display_name.unwrap_or_else(|| entry.subject_id.clone());
        Self {
            subject_id: entry.subject_id,
            display_name,
            source_url: entry.source_url,
            remote_modified_at: entry.remote_modified_at,
        }
    }
}
