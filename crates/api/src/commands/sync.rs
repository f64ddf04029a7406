//! Batch lifecycle commands

use docsync_core::Subscription;
use docsync_domain::{SyncItem, SyncState};

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Reconcile the catalog and download missing or outdated documents
pub async fn start_day(context: &AppContext) -> Result<SyncState, String> {
    execute_command("sync::start_day", || context.engine.start_day()).await
}

/// Start a batch over an explicit item list
pub async fn start_batch(context: &AppContext, items: Vec<SyncItem>) -> Result<SyncState, String> {
    execute_command("sync::start_batch", || context.engine.start_batch(items)).await
}

/// Continue the persisted batch left by an earlier run
pub async fn resume_batch(context: &AppContext) -> Result<SyncState, String> {
    execute_command("sync::resume_batch", || context.engine.resume_batch()).await
}

pub async fn cancel_sync(context: &AppContext) -> Result<(), String> {
    execute_command("sync::cancel_sync", || context.engine.cancel_sync()).await
}

/// Dismiss a COMPLETED or ERROR summary
pub async fn acknowledge_sync(context: &AppContext) -> Result<(), String> {
    execute_command("sync::acknowledge_sync", || async { context.engine.acknowledge() }).await
}

pub fn get_sync_state(context: &AppContext) -> SyncState {
    context.engine.current_state()
}

/// Register a progress listener; it first receives the current snapshot.
///
/// Keep the returned handle alive for as long as updates are wanted.
pub fn subscribe_sync<F>(context: &AppContext, listener: F) -> Subscription
where
    F: Fn(&SyncState) + Send + Sync + 'static,
{
    context.engine.subscribe(listener)
}
