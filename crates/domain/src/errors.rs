//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for DocSync
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum DocSyncError {
    #[error("Database error: {0}")]
    Database(String),

    /// The local store could not be opened or used.
    ///
    /// `recoverable` failures may be repaired by resetting the store;
    /// fatal ones (access denial, read-only media) cannot.
    #[error("Storage unavailable: {message}")]
    StorageUnavailable { recoverable: bool, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocSyncError {
    /// True when a store reset is expected to repair this failure.
    pub fn is_recoverable_storage(&self) -> bool {
        matches!(self, Self::StorageUnavailable { recoverable: true, .. })
    }

    /// True for storage failures a reset cannot fix.
    pub fn is_fatal_storage(&self) -> bool {
        matches!(self, Self::StorageUnavailable { recoverable: false, .. })
    }
}

/// Result type alias for DocSync operations
pub type Result<T> = std::result::Result<T, DocSyncError>;

/// Categories of binary fetch failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchErrorCategory {
    /// Connectivity was lost or the server was transiently unavailable.
    /// The item is retried after the network comes back.
    NetworkTransient,
    /// The transfer completed but the response is unusable.
    /// The item is recorded as failed for this batch.
    Content,
}

/// Binary fetch errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchError {
    #[error("Network unreachable: {0}")]
    Network(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Invalid content: {0}")]
    Content(String),
}

impl FetchError {
    /// Get the error category for this error
    pub fn category(&self) -> FetchErrorCategory {
        match self {
            Self::Network(_) | Self::Timeout(_) => FetchErrorCategory::NetworkTransient,
            Self::Http { .. } | Self::Content(_) => FetchErrorCategory::Content,
        }
    }

    /// Check whether this failure looks like lost connectivity
    pub fn is_network_loss(&self) -> bool {
        self.category() == FetchErrorCategory::NetworkTransient
    }
}

impl From<FetchError> for DocSyncError {
    fn from(err: FetchError) -> Self {
        match err.category() {
            FetchErrorCategory::NetworkTransient => Self::Network(err.to_string()),
            FetchErrorCategory::Content => Self::InvalidInput(err.to_string()),
        }
    }
}
