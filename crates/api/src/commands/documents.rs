//! Cached document commands

use docsync_domain::SessionCounters;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Presence check answered from memory
pub fn is_cached(context: &AppContext, subject_id: &str) -> bool {
    context.engine.is_cached_sync(subject_id)
}

pub async fn get_cached_binary(
    context: &AppContext,
    subject_id: &str,
) -> Result<Option<Vec<u8>>, String> {
    execute_command("documents::get_cached_binary", || context.engine.get_cached_binary(subject_id))
        .await
}

pub async fn remove_document(context: &AppContext, subject_id: &str) -> Result<bool, String> {
    execute_command("documents::remove_document", || context.engine.remove_document(subject_id))
        .await
}

/// Summary of the last batch
pub async fn get_session_counters(
    context: &AppContext,
) -> Result<Option<SessionCounters>, String> {
    execute_command("documents::get_session_counters", || context.engine.session_counters()).await
}
