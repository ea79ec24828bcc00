pub mod rest;

pub use rest::RestStore;

use crate::models::{GuildChannelSetting, MessageRecord, UserLink};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("store returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Hosted table store holding user links, per-guild channel settings and the
/// conversation log. The store itself is an external collaborator; this
/// trait is the seam the rest of the bot depends on.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_user_link(&self, discord_user_id: &str)
        -> Result<Option<UserLink>, StoreError>;

    async fn list_user_links(&self) -> Result<Vec<UserLink>, StoreError>;

    async fn list_channel_settings(&self) -> Result<Vec<GuildChannelSetting>, StoreError>;

    /// At most one channel per guild; setting twice overwrites.
    async fn upsert_channel_setting(
        &self,
        setting: &GuildChannelSetting,
    ) -> Result<(), StoreError>;

    /// Removing a non-existent entry is a no-op.
    async fn delete_channel_setting(&self, guild_id: &str) -> Result<(), StoreError>;

    /// Most recent first.
    async fn recent_messages(
        &self,
        discord_user_id: &str,
        limit: usize,
    ) -> Result<Vec<MessageRecord>, StoreError>;
}
