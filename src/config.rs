use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Which inbound messages get forwarded to the chat API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum ForwardScope {
    /// Direct messages only.
    Dm,
    /// Messages in the channel bound via /setchannel, per guild.
    BoundChannel,
}

impl FromStr for ForwardScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dm" => Ok(ForwardScope::Dm),
            "guild" | "channel" => Ok(ForwardScope::BoundChannel),
            other => Err(format!("unknown forward scope '{}'", other)),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct Config {
    pub discord_token: String,
    pub store_url: String,
    pub store_service_key: String,
    pub chat_api_url: String,
    pub chat_api_token: String,
    pub forward_scope: ForwardScope,
    pub require_link: bool,
    pub history_limit: usize,
    pub reminder_interval_secs: u64,
    pub reminder_after_hours: i64,
    pub status_message: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        let store_service_key = env::var("STORE_SERVICE_KEY")
            .map_err(|_| anyhow::anyhow!("STORE_SERVICE_KEY must be set"))?;
        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            store_url: env::var("STORE_URL")
                .map_err(|_| anyhow::anyhow!("STORE_URL must be set"))?,
            chat_api_url: env::var("CHAT_API_URL")
                .map_err(|_| anyhow::anyhow!("CHAT_API_URL must be set"))?,
            // The chat API accepts the store service key unless a dedicated
            // token is configured.
            chat_api_token: env::var("CHAT_API_TOKEN")
                .unwrap_or_else(|_| store_service_key.clone()),
            store_service_key,
            forward_scope: env::var("FORWARD_SCOPE")
                .unwrap_or_else(|_| "dm".to_string())
                .parse()
                .unwrap_or(ForwardScope::Dm),
            require_link: env::var("REQUIRE_LINK")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            history_limit: env::var("HISTORY_LIMIT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            reminder_interval_secs: env::var("REMINDER_INTERVAL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),
            reminder_after_hours: env::var("REMINDER_AFTER_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),
            status_message: env::var("STATUS_MESSAGE")
                .unwrap_or_else(|_| "Chatting with Mai 💬".to_string()),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("store_url", &self.store_url)
            .field("store_service_key", &"[REDACTED]")
            .field("chat_api_url", &self.chat_api_url)
            .field("chat_api_token", &"[REDACTED]")
            .field("forward_scope", &self.forward_scope)
            .field("require_link", &self.require_link)
            .field("history_limit", &self.history_limit)
            .field("reminder_interval_secs", &self.reminder_interval_secs)
            .field("reminder_after_hours", &self.reminder_after_hours)
            .field("status_message", &self.status_message)
            .finish()
    }
}

/// Discord message limit is 2000 characters
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_logic() {
        // 1. Test missing vars
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("STORE_URL");
        env::remove_var("STORE_SERVICE_KEY");
        env::remove_var("CHAT_API_URL");
        let result = Config::build();
        assert!(result.is_err(), "Should fail when required vars are missing");

        // 2. Test defaults
        env::set_var("DISCORD_TOKEN", "test_token");
        env::set_var("STORE_URL", "https://store.example");
        env::set_var("STORE_SERVICE_KEY", "secret_service_key");
        env::set_var("CHAT_API_URL", "https://chat.example/api/chat");
        let config = Config::build().unwrap();
        assert_eq!(config.discord_token, "test_token");
        assert_eq!(config.forward_scope, ForwardScope::Dm);
        assert!(config.require_link);
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.reminder_interval_secs, 3600);
        assert_eq!(config.reminder_after_hours, 24);
        // Chat API token falls back to the service key
        assert_eq!(config.chat_api_token, "secret_service_key");

        // 3. Test scope parsing
        env::set_var("FORWARD_SCOPE", "guild");
        let config = Config::build().unwrap();
        assert_eq!(config.forward_scope, ForwardScope::BoundChannel);
        env::set_var("FORWARD_SCOPE", "nonsense");
        let config = Config::build().unwrap();
        assert_eq!(config.forward_scope, ForwardScope::Dm);

        // 4. Test debug redaction
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("test_token"));
        assert!(!debug_output.contains("secret_service_key"));
        assert!(debug_output.contains("[REDACTED]"));

        // Cleanup
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("STORE_URL");
        env::remove_var("STORE_SERVICE_KEY");
        env::remove_var("CHAT_API_URL");
        env::remove_var("FORWARD_SCOPE");
    }
}
