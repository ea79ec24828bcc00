//! PostgREST-style client for the hosted table store.
//!
//! Every request carries the service key as both `apikey` header and bearer
//! token, matching how the hosted store authenticates server-side callers.

use crate::config::Config;
use crate::models::{GuildChannelSetting, MessageRecord, UserLink};
use crate::store::{Store, StoreError};
use async_trait::async_trait;
use reqwest::Response;
use tracing::debug;

const USER_LINKS_TABLE: &str = "discord_user_links";
const CHANNEL_SETTINGS_TABLE: &str = "discord_channel_settings";
const MESSAGES_TABLE: &str = "discord_messages";

pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl RestStore {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: config.store_url.trim_end_matches('/').to_string(),
            service_key: config.store_service_key.clone(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    fn check_status(resp: Response) -> Result<Response, StoreError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(StoreError::Status(resp.status()))
        }
    }
}

#[async_trait]
impl Store for RestStore {
    async fn get_user_link(
        &self,
        discord_user_id: &str,
    ) -> Result<Option<UserLink>, StoreError> {
        let filter = format!("eq.{}", discord_user_id);
        let resp = self
            .authed(self.client.get(self.table_url(USER_LINKS_TABLE)))
            .query(&[
                ("select", "discord_user_id"),
                ("discord_user_id", filter.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?;
        let rows: Vec<UserLink> = Self::check_status(resp)?.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn list_user_links(&self) -> Result<Vec<UserLink>, StoreError> {
        let resp = self
            .authed(self.client.get(self.table_url(USER_LINKS_TABLE)))
            .query(&[("select", "discord_user_id")])
            .send()
            .await?;
        let rows: Vec<UserLink> = Self::check_status(resp)?.json().await?;
        debug!("Store: loaded {} user links", rows.len());
        Ok(rows)
    }

    async fn list_channel_settings(&self) -> Result<Vec<GuildChannelSetting>, StoreError> {
        let resp = self
            .authed(self.client.get(self.table_url(CHANNEL_SETTINGS_TABLE)))
            .query(&[("select", "guild_id,channel_id")])
            .send()
            .await?;
        let rows: Vec<GuildChannelSetting> = Self::check_status(resp)?.json().await?;
        debug!("Store: loaded {} channel settings", rows.len());
        Ok(rows)
    }

    async fn upsert_channel_setting(
        &self,
        setting: &GuildChannelSetting,
    ) -> Result<(), StoreError> {
        let resp = self
            .authed(self.client.post(self.table_url(CHANNEL_SETTINGS_TABLE)))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&[setting])
            .send()
            .await?;
        Self::check_status(resp)?;
        Ok(())
    }

    async fn delete_channel_setting(&self, guild_id: &str) -> Result<(), StoreError> {
        let filter = format!("eq.{}", guild_id);
        let resp = self
            .authed(self.client.delete(self.table_url(CHANNEL_SETTINGS_TABLE)))
            .query(&[("guild_id", filter.as_str())])
            .send()
            .await?;
        Self::check_status(resp)?;
        Ok(())
    }

    async fn recent_messages(
        &self,
        discord_user_id: &str,
        limit: usize,
    ) -> Result<Vec<MessageRecord>, StoreError> {
        let filter = format!("eq.{}", discord_user_id);
        let limit = limit.to_string();
        let resp = self
            .authed(self.client.get(self.table_url(MESSAGES_TABLE)))
            .query(&[
                ("select", "role,content,emotion,created_at"),
                ("discord_user_id", filter.as_str()),
                ("order", "created_at.desc"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;
        let rows: Vec<MessageRecord> = Self::check_status(resp)?.json().await?;
        Ok(rows)
    }
}
