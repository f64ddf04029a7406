//! Conversions from external infrastructure errors into domain errors.

use docsync_common::storage::{StorageError, StorageRecovery};
use docsync_domain::DocSyncError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub DocSyncError);

impl From<InfraError> for DocSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<DocSyncError> for InfraError {
    fn from(value: DocSyncError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoDocSyncError {
    fn into_docsync(self) -> DocSyncError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → DocSyncError */
/* -------------------------------------------------------------------------- */

impl IntoDocSyncError for SqlError {
    fn into_docsync(self) -> DocSyncError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => DocSyncError::Database("database is busy".into()),
                    (ErrorCode::DatabaseLocked, _) => {
                        DocSyncError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067 | 1555) => {
                        DocSyncError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 275) => {
                        DocSyncError::Database(format!("check constraint violation: {message}"))
                    }
                    (ErrorCode::DatabaseCorrupt | ErrorCode::NotADatabase, _) => {
                        DocSyncError::StorageUnavailable {
                            recoverable: true,
                            message: format!("database file is corrupted: {message}"),
                        }
                    }
                    (
                        ErrorCode::PermissionDenied | ErrorCode::ReadOnly | ErrorCode::CannotOpen,
                        _,
                    ) => DocSyncError::StorageUnavailable {
                        recoverable: false,
                        message: format!("database cannot be written: {message}"),
                    },
                    _ => DocSyncError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => DocSyncError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                DocSyncError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                DocSyncError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => DocSyncError::Database("invalid UTF-8 returned from sqlite".into()),
            RE::InvalidPath(path) => DocSyncError::StorageUnavailable {
                recoverable: false,
                message: format!("invalid database path: {}", path.to_string_lossy()),
            },
            RE::InvalidQuery => DocSyncError::Database("invalid SQL query".into()),
            other => DocSyncError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_docsync())
    }
}

/* -------------------------------------------------------------------------- */
/* StorageError → DocSyncError */
/* -------------------------------------------------------------------------- */

impl IntoDocSyncError for StorageError {
    fn into_docsync(self) -> DocSyncError {
        if let StorageError::Rusqlite(err) = self {
            return err.into_docsync();
        }

        let message = self.to_string();
        match self.recovery() {
            StorageRecovery::Recoverable => {
                DocSyncError::StorageUnavailable { recoverable: true, message }
            }
            StorageRecovery::Fatal => DocSyncError::StorageUnavailable { recoverable: false, message },
            StorageRecovery::Transient => DocSyncError::Database(message),
        }
    }
}

impl From<StorageError> for InfraError {
    fn from(value: StorageError) -> Self {
        InfraError(value.into_docsync())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → DocSyncError */
/* -------------------------------------------------------------------------- */

impl IntoDocSyncError for HttpError {
    fn into_docsync(self) -> DocSyncError {
        if self.is_timeout() {
            return DocSyncError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return DocSyncError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                404 => DocSyncError::NotFound(message),
                408 | 429 => DocSyncError::Network(message),
                400..=499 => DocSyncError::InvalidInput(message),
                _ => DocSyncError::Network(message),
            };
        }

        DocSyncError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_docsync())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
