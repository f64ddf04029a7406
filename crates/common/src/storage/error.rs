//! Storage error types
//!
//! Defines error types for the storage layer and classifies every failure as
//! recoverable (a reset can repair it), fatal (the medium is unusable and
//! the caller must be told), or transient (retry later, never reset).

use rusqlite::ErrorCode;
use thiserror::Error;

use crate::error::{ErrorClassification, ErrorSeverity};

/// Storage error type
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(String),

    #[error("Database file is corrupted: {0}")]
    Corrupted(String),

    #[error("Database access denied: {0}")]
    AccessDenied(String),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Database pool exhausted")]
    PoolExhausted,

    #[error("Connection timeout after {0}s")]
    Timeout(u64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch { expected: i32, found: i32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Rusqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    R2d2(#[from] r2d2::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

/// Storage result type
pub type StorageResult<T> = Result<T, StorageError>;

/// How a storage failure may be handled by the owner of the database file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageRecovery {
    /// Dropping and recreating the store is expected to repair the failure.
    Recoverable,
    /// The storage medium cannot be used; surface to the user untouched.
    Fatal,
    /// Contention or exhaustion; retrying later may succeed.
    Transient,
}

impl StorageError {
    /// Classify this failure for the open/reset recovery path.
    pub fn recovery(&self) -> StorageRecovery {
        match self {
            Self::Corrupted(_)
            | Self::Migration(_)
            | Self::Query(_)
            | Self::SchemaVersionMismatch { .. }
            | Self::SerdeJson(_) => StorageRecovery::Recoverable,
            Self::AccessDenied(_)
            | Self::Connection(_)
            | Self::InvalidConfig(_)
            | Self::Io(_)
            | Self::R2d2(_) => StorageRecovery::Fatal,
            Self::PoolExhausted | Self::Timeout(_) => StorageRecovery::Transient,
            Self::Rusqlite(err) => classify_sqlite_error(err),
        }
    }

    /// Returns true when a reset of the store is expected to repair the
    /// failure.
    pub fn is_recoverable(&self) -> bool {
        self.recovery() == StorageRecovery::Recoverable
    }

    /// Map an opaque driver/pool message onto the closest storage error.
    ///
    /// r2d2 flattens initialisation errors into strings, so pool creation has
    /// to rely on SQLite's well-known message texts.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        if lower.contains("file is not a database")
            || lower.contains("database disk image is malformed")
            || lower.contains("notadb")
            || lower.contains("corrupt")
        {
            Self::Corrupted(message)
        } else if lower.contains("permission denied")
            || lower.contains("readonly database")
            || lower.contains("read-only")
            || lower.contains("unable to open database file")
            || lower.contains("access denied")
        {
            Self::AccessDenied(message)
        } else if lower.contains("timed out") || lower.contains("timeout") {
            Self::Timeout(0)
        } else {
            Self::Connection(message)
        }
    }
}

fn classify_sqlite_error(err: &rusqlite::Error) -> StorageRecovery {
    match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => StorageRecovery::Transient,
        Some(
            ErrorCode::PermissionDenied
            | ErrorCode::ReadOnly
            | ErrorCode::CannotOpen
            | ErrorCode::AuthorizationForStatementDenied
            | ErrorCode::DiskFull
            | ErrorCode::SystemIoFailure
            | ErrorCode::NoLargeFileSupport
            | ErrorCode::FileLockingProtocolFailed,
        ) => StorageRecovery::Fatal,
        // Corruption, internal malfunctions, schema drift, and row shapes that
        // no longer match the compiled schema are all repaired by a rebuild.
        _ => StorageRecovery::Recoverable,
    }
}

impl ErrorClassification for StorageError {
    /// Retryable errors include connection timeouts, pool exhaustion, and
    /// SQLite BUSY/LOCKED contention.
    fn is_retryable(&self) -> bool {
        self.recovery() == StorageRecovery::Transient
    }

    fn severity(&self) -> ErrorSeverity {
        match self.recovery() {
            StorageRecovery::Transient => ErrorSeverity::Warning,
            StorageRecovery::Recoverable => ErrorSeverity::Error,
            StorageRecovery::Fatal => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(
            self,
            Self::Corrupted(_) | Self::AccessDenied(_) | Self::SchemaVersionMismatch { .. }
        ) || self.recovery() == StorageRecovery::Fatal
    }
}
