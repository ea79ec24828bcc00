//! Short-term memory for relay calls.
//!
//! The store serves the conversation log most-recent-first; the chat API
//! expects chronological order, oldest first.

use crate::models::{MemoryEntry, MessageRecord};
use crate::store::Store;
use tracing::warn;

/// Fetches up to `limit` recent log entries for the user and assembles them
/// in chronological order. A store failure is logged and treated as empty
/// history; a limit of 0 skips the read entirely.
pub async fn load_short_term_memory(
    store: &dyn Store,
    discord_user_id: &str,
    limit: usize,
) -> Vec<MemoryEntry> {
    if limit == 0 {
        return Vec::new();
    }
    match store.recent_messages(discord_user_id, limit).await {
        Ok(records) => assemble(records),
        Err(e) => {
            warn!(
                "Could not load history for {}, continuing without: {}",
                discord_user_id, e
            );
            Vec::new()
        }
    }
}

/// `records` is most-recent-first as served by the store.
pub fn assemble(mut records: Vec<MessageRecord>) -> Vec<MemoryEntry> {
    records.reverse();
    records
        .into_iter()
        .map(|r| MemoryEntry {
            role: r.role,
            content: r.content,
        })
        .collect()
}
