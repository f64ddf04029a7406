use std::time::Duration;

use docsync_domain::{DocSyncError, LoggingConfig};
use tracing::{info, warn};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `logging.level`; `logging.json` switches the output
/// to one JSON object per event.
///
/// # Errors
/// Returns an error if a global subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        registry.with(fmt::layer().json().with_current_span(false)).try_init()
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()
    }
}

/// Log the outcome of a command execution with structured fields.
///
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, success: bool) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    if success {
        info!(command, duration_ms, "command_execution_success");
    } else {
        warn!(command, duration_ms, "command_execution_failure");
    }
}

/// Convert a `DocSyncError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &DocSyncError) -> &'static str {
    match error {
        DocSyncError::Database(_) => "database",
        DocSyncError::StorageUnavailable { recoverable: true, .. } => "storage_recoverable",
        DocSyncError::StorageUnavailable { recoverable: false, .. } => "storage_fatal",
        DocSyncError::Config(_) => "config",
        DocSyncError::Network(_) => "network",
        DocSyncError::NotFound(_) => "not_found",
        DocSyncError::InvalidInput(_) => "invalid_input",
        DocSyncError::InvalidState(_) => "invalid_state",
        DocSyncError::Internal(_) => "internal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_labels_split_storage_recovery() {
        let recoverable =
            DocSyncError::StorageUnavailable { recoverable: true, message: "corrupt".into() };
        let fatal = DocSyncError::StorageUnavailable { recoverable: false, message: "ro".into() };

        assert_eq!(error_label(&recoverable), "storage_recoverable");
        assert_eq!(error_label(&fatal), "storage_fatal");
        assert_eq!(error_label(&DocSyncError::InvalidState("busy".into())), "invalid_state");
    }
}
