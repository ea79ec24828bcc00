//! Decides whether an inbound message is forwarded to the chat API.
//!
//! One policy object covers both deployment shapes: DM-only (optionally
//! gated on a completed account link) and per-guild bound channel. The
//! guild -> channel map is hydrated from the store at startup and kept in
//! sync by the /setchannel and /removechannel commands.

use crate::config::ForwardScope;
use crate::models::GuildChannelSetting;
use crate::store::{Store, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{error, warn};

/// The routing-relevant slice of a gateway message event.
#[derive(Debug, Clone, Copy)]
pub struct InboundMessage {
    pub author_id: u64,
    pub author_is_bot: bool,
    /// `None` for direct messages.
    pub guild_id: Option<u64>,
    pub channel_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Relay the message to the chat API and reply in the same channel.
    Forward,
    /// DM from a user without a link row: answer with the link prompt.
    PromptLink,
    Ignore,
}

pub struct ChannelPolicy {
    scope: ForwardScope,
    require_link: bool,
    bound: Mutex<HashMap<u64, u64>>,
    store: Arc<dyn Store>,
}

impl ChannelPolicy {
    pub fn new(scope: ForwardScope, require_link: bool, store: Arc<dyn Store>) -> Self {
        Self {
            scope,
            require_link,
            bound: Mutex::new(HashMap::new()),
            store,
        }
    }

    /// Loads all persisted channel bindings into the in-memory map.
    /// Returns the number of bindings loaded.
    pub async fn hydrate(&self) -> Result<usize, StoreError> {
        let settings = self.store.list_channel_settings().await?;
        let mut bound = self.bound.lock().unwrap();
        bound.clear();
        for setting in &settings {
            match (setting.guild_id.parse(), setting.channel_id.parse()) {
                (Ok(guild), Ok(channel)) => {
                    bound.insert(guild, channel);
                }
                _ => warn!(
                    "Skipping channel setting with non-numeric ids: {:?}",
                    setting
                ),
            }
        }
        Ok(bound.len())
    }

    pub async fn decide(&self, msg: &InboundMessage) -> RouteDecision {
        if msg.author_is_bot {
            return RouteDecision::Ignore;
        }

        match self.scope {
            ForwardScope::Dm => {
                if msg.guild_id.is_some() {
                    return RouteDecision::Ignore;
                }
                if !self.require_link {
                    return RouteDecision::Forward;
                }
                // A failed link lookup is treated the same as a missing link:
                // the user gets the link prompt rather than silence.
                match self.store.get_user_link(&msg.author_id.to_string()).await {
                    Ok(Some(_)) => RouteDecision::Forward,
                    Ok(None) => RouteDecision::PromptLink,
                    Err(e) => {
                        error!("Could not check user link: {}", e);
                        RouteDecision::PromptLink
                    }
                }
            }
            ForwardScope::BoundChannel => match msg.guild_id {
                Some(guild_id) if self.bound_channel(guild_id) == Some(msg.channel_id) => {
                    RouteDecision::Forward
                }
                _ => RouteDecision::Ignore,
            },
        }
    }

    pub fn bound_channel(&self, guild_id: u64) -> Option<u64> {
        self.bound.lock().unwrap().get(&guild_id).copied()
    }

    /// Binds a guild to a channel. The in-memory map is updated even when
    /// the store write fails, so the binding takes effect for the current
    /// session; the error is returned for the caller to surface.
    pub async fn set_channel(&self, guild_id: u64, channel_id: u64) -> Result<(), StoreError> {
        let result = self
            .store
            .upsert_channel_setting(&GuildChannelSetting {
                guild_id: guild_id.to_string(),
                channel_id: channel_id.to_string(),
            })
            .await;
        self.bound.lock().unwrap().insert(guild_id, channel_id);
        result
    }

    /// Unbinds a guild's channel. A no-op when no binding exists.
    pub async fn remove_channel(&self, guild_id: u64) -> Result<(), StoreError> {
        let result = self.store.delete_channel_setting(&guild_id.to_string()).await;
        self.bound.lock().unwrap().remove(&guild_id);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MessageRecord, UserLink};
    use async_trait::async_trait;
    use std::collections::HashSet;

    #[derive(Default)]
    struct FakeStore {
        links: Mutex<HashSet<String>>,
        settings: Mutex<HashMap<String, String>>,
        fail_writes: bool,
        fail_reads: bool,
    }

    #[async_trait]
    impl Store for FakeStore {
        async fn get_user_link(
            &self,
            discord_user_id: &str,
        ) -> Result<Option<UserLink>, StoreError> {
            if self.fail_reads {
                return Err(StoreError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE));
            }
            let links = self.links.lock().unwrap();
            Ok(links.get(discord_user_id).map(|id| UserLink {
                discord_user_id: id.clone(),
            }))
        }

        async fn list_user_links(&self) -> Result<Vec<UserLink>, StoreError> {
            let links = self.links.lock().unwrap();
            Ok(links
                .iter()
                .map(|id| UserLink {
                    discord_user_id: id.clone(),
                })
                .collect())
        }

        async fn list_channel_settings(&self) -> Result<Vec<GuildChannelSetting>, StoreError> {
            let settings = self.settings.lock().unwrap();
            Ok(settings
                .iter()
                .map(|(g, c)| GuildChannelSetting {
                    guild_id: g.clone(),
                    channel_id: c.clone(),
                })
                .collect())
        }

        async fn upsert_channel_setting(
            &self,
            setting: &GuildChannelSetting,
        ) -> Result<(), StoreError> {
            if self.fail_writes {
                return Err(StoreError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE));
            }
            self.settings
                .lock()
                .unwrap()
                .insert(setting.guild_id.clone(), setting.channel_id.clone());
            Ok(())
        }

        async fn delete_channel_setting(&self, guild_id: &str) -> Result<(), StoreError> {
            if self.fail_writes {
                return Err(StoreError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE));
            }
            self.settings.lock().unwrap().remove(guild_id);
            Ok(())
        }

        async fn recent_messages(
            &self,
            _discord_user_id: &str,
            _limit: usize,
        ) -> Result<Vec<MessageRecord>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn dm(author_id: u64) -> InboundMessage {
        InboundMessage {
            author_id,
            author_is_bot: false,
            guild_id: None,
            channel_id: 1,
        }
    }

    fn guild_msg(guild_id: u64, channel_id: u64) -> InboundMessage {
        InboundMessage {
            author_id: 42,
            author_is_bot: false,
            guild_id: Some(guild_id),
            channel_id,
        }
    }

    #[tokio::test]
    async fn test_bot_authors_never_forward() {
        let store = Arc::new(FakeStore::default());
        let policy = ChannelPolicy::new(ForwardScope::Dm, false, store);
        let msg = InboundMessage {
            author_id: 42,
            author_is_bot: true,
            guild_id: None,
            channel_id: 1,
        };
        assert_eq!(policy.decide(&msg).await, RouteDecision::Ignore);
    }

    #[tokio::test]
    async fn test_dm_scope_ignores_guild_messages() {
        let store = Arc::new(FakeStore::default());
        let policy = ChannelPolicy::new(ForwardScope::Dm, false, store);
        assert_eq!(policy.decide(&guild_msg(10, 20)).await, RouteDecision::Ignore);
        assert_eq!(policy.decide(&dm(42)).await, RouteDecision::Forward);
    }

    #[tokio::test]
    async fn test_dm_link_requirement() {
        let store = Arc::new(FakeStore::default());
        store.links.lock().unwrap().insert("42".to_string());
        let policy = ChannelPolicy::new(ForwardScope::Dm, true, store);

        assert_eq!(policy.decide(&dm(42)).await, RouteDecision::Forward);
        assert_eq!(policy.decide(&dm(43)).await, RouteDecision::PromptLink);
    }

    #[tokio::test]
    async fn test_dm_link_check_failure_prompts() {
        let store = Arc::new(FakeStore {
            fail_reads: true,
            ..Default::default()
        });
        let policy = ChannelPolicy::new(ForwardScope::Dm, true, store);
        assert_eq!(policy.decide(&dm(42)).await, RouteDecision::PromptLink);
    }

    #[tokio::test]
    async fn test_set_channel_then_forward() {
        let store = Arc::new(FakeStore::default());
        let policy = ChannelPolicy::new(ForwardScope::BoundChannel, false, store.clone());

        // Nothing bound yet
        assert_eq!(policy.decide(&guild_msg(10, 20)).await, RouteDecision::Ignore);

        policy.set_channel(10, 20).await.unwrap();
        assert_eq!(policy.decide(&guild_msg(10, 20)).await, RouteDecision::Forward);
        // Another channel in the same guild does not forward
        assert_eq!(policy.decide(&guild_msg(10, 21)).await, RouteDecision::Ignore);
        // DMs do not forward in guild scope
        assert_eq!(policy.decide(&dm(42)).await, RouteDecision::Ignore);
        // Persisted too
        assert_eq!(
            store.settings.lock().unwrap().get("10"),
            Some(&"20".to_string())
        );

        // Setting again overwrites
        policy.set_channel(10, 99).await.unwrap();
        assert_eq!(policy.decide(&guild_msg(10, 20)).await, RouteDecision::Ignore);
        assert_eq!(policy.decide(&guild_msg(10, 99)).await, RouteDecision::Forward);
    }

    #[tokio::test]
    async fn test_remove_channel_stops_forwarding() {
        let store = Arc::new(FakeStore::default());
        let policy = ChannelPolicy::new(ForwardScope::BoundChannel, false, store.clone());

        policy.set_channel(10, 20).await.unwrap();
        policy.remove_channel(10).await.unwrap();
        assert_eq!(policy.decide(&guild_msg(10, 20)).await, RouteDecision::Ignore);
        assert!(store.settings.lock().unwrap().is_empty());

        // Removing again is a no-op
        policy.remove_channel(10).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_channel_updates_map_on_store_failure() {
        let store = Arc::new(FakeStore {
            fail_writes: true,
            ..Default::default()
        });
        let policy = ChannelPolicy::new(ForwardScope::BoundChannel, false, store);

        assert!(policy.set_channel(10, 20).await.is_err());
        // Binding still takes effect for the running session
        assert_eq!(policy.decide(&guild_msg(10, 20)).await, RouteDecision::Forward);
    }

    #[tokio::test]
    async fn test_hydrate_loads_persisted_bindings() {
        let store = Arc::new(FakeStore::default());
        store
            .settings
            .lock()
            .unwrap()
            .insert("10".to_string(), "20".to_string());
        store
            .settings
            .lock()
            .unwrap()
            .insert("bad".to_string(), "ids".to_string());

        let policy = ChannelPolicy::new(ForwardScope::BoundChannel, false, store);
        let loaded = policy.hydrate().await.unwrap();
        assert_eq!(loaded, 1);
        assert_eq!(policy.bound_channel(10), Some(20));
    }
}
