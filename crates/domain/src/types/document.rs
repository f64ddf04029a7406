//! Cached document types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Lifecycle marker of a cached document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentState {
    #[default]
    Ready,
    Failed,
    Stale,
}

impl_domain_status_conversions!(DocumentState {
    Ready => "READY",
    Failed => "FAILED",
    Stale => "STALE",
});

/// One locally stored binary artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedDocument {
    pub subject_id: String,
    pub display_name: String,
    pub blob: Vec<u8>,
    pub size_bytes: u64,
    pub downloaded_at: DateTime<Utc>,
    pub state: DocumentState,
    pub last_sync_attempt: Option<DateTime<Utc>>,
}

impl CachedDocument {
    /// Build a READY document from a freshly downloaded body.
    pub fn ready(
        subject_id: impl Into<String>,
        display_name: impl Into<String>,
        blob: Vec<u8>,
        downloaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            display_name: display_name.into(),
            size_bytes: blob.len() as u64,
            blob,
            downloaded_at,
            state: DocumentState::Ready,
            last_sync_attempt: Some(downloaded_at),
        }
    }

    /// A document is usable when it has a body whose recorded size matches.
    pub fn is_structurally_valid(&self) -> bool {
        !self.blob.is_empty() && self.size_bytes > 0 && self.size_bytes == self.blob.len() as u64
    }

    /// Metadata view without the body
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            subject_id: self.subject_id.clone(),
            display_name: self.display_name.clone(),
            size_bytes: self.size_bytes,
            blob_len: self.blob.len() as u64,
            downloaded_at: self.downloaded_at,
            state: self.state,
            last_sync_attempt: self.last_sync_attempt,
        }
    }
}

/// A cached document without its body.
///
/// Verification and freshness checks only need metadata, so the store can
/// answer them without loading every blob into memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub subject_id: String,
    pub display_name: String,
    pub size_bytes: u64,
    pub blob_len: u64,
    pub downloaded_at: DateTime<Utc>,
    pub state: DocumentState,
    pub last_sync_attempt: Option<DateTime<Utc>>,
}

impl DocumentSummary {
    pub fn is_structurally_valid(&self) -> bool {
        self.blob_len > 0 && self.size_bytes > 0 && self.size_bytes == self.blob_len
    }
}
