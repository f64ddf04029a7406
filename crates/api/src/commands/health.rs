//! Health and storage recovery commands

use docsync_domain::HealthCheckResult;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Verify the local store and report cache and resume state
///
/// Never fails: storage problems are reported inside the result.
///
/// # Example Response
/// ```json
/// {
///   "healthy": true,
///   "db_accessible": true,
///   "stores_accessible": true,
///   "total_count": 12,
///   "verified_count": 12,
///   "failed_count": 0,
///   "has_pending_sync": false,
///   "pending_count": 0,
///   "error": null
/// }
/// ```
pub async fn check_health(context: &AppContext) -> Result<HealthCheckResult, String> {
    execute_command("health::check_health", || async { Ok(context.engine.check_health().await) })
        .await
}

/// Drop and recreate the local store, then re-run the health check
///
/// This is the manual-reset affordance offered when storage is unavailable.
pub async fn reset_storage(context: &AppContext) -> Result<HealthCheckResult, String> {
    execute_command("health::reset_storage", || context.engine.reset_storage()).await
}
