//! Command execution helpers
//!
//! Every entry point a UI shell calls goes through [`execute_command`], which
//! times the call, logs the outcome, and flattens the typed error into the
//! string the shell displays.

use std::future::Future;
use std::time::Instant;

use docsync_domain::Result as DomainResult;
use tracing::error;

use crate::utils::logging::{error_label, log_command_execution};

/// Execute a command with logging and `String` error conversion.
///
/// # Example
///
/// ```rust,ignore
/// pub async fn my_command(ctx: &AppContext) -> Result<MyResponse, String> {
///     execute_command("my_module::my_command", || async {
///         ctx.engine.do_something().await
///     })
///     .await
/// }
/// ```
pub async fn execute_command<F, Fut, T>(command_name: &str, command_fn: F) -> Result<T, String>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();

    let result = command_fn().await;

    log_command_execution(command_name, start.elapsed(), result.is_ok());

    result.map_err(|err| {
        error!(command = command_name, error_type = error_label(&err), error = %err, "command failed");
        err.to_string()
    })
}

#[cfg(test)]
mod tests {
    use docsync_domain::DocSyncError;

    use super::*;

    #[tokio::test]
    async fn test_success_passes_value_through() {
        let value = execute_command("test::ok", || async { Ok(7) }).await;
        assert_eq!(value, Ok(7));
    }

    #[tokio::test]
    async fn test_error_is_flattened_to_display_string() {
        let result: Result<(), String> = execute_command("test::err", || async {
            Err(DocSyncError::InvalidState("A sync batch is already running".into()))
        })
        .await;

        assert_eq!(result, Err("Invalid state: A sync batch is already running".to_string()));
    }
}
