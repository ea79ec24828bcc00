use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat-platform user that completed account linking in the web app.
/// Rows are created by the external linking flow; this bot only reads them.
#[derive(Debug, Clone, Deserialize)]
pub struct UserLink {
    pub discord_user_id: String,
}

/// The single channel in which a guild receives bot replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildChannelSetting {
    pub guild_id: String,
    pub channel_id: String,
}

/// One entry of the append-only conversation log. Written by the chat API,
/// read here for short-term memory and reminder staleness checks.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageRecord {
    pub role: String,
    pub content: String,
    pub emotion: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One element of the `shortTermMemory` relay payload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MemoryEntry {
    pub role: String,
    pub content: String,
}

/// Fixed-shape emotional state sent with every relay call. This layer does
/// not compute emotional state; the defaults below go out verbatim.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalState {
    pub emotion: String,
    pub intensity: u8,
    pub affection_level: u8,
    pub trust_level: u8,
    pub interaction_count: u32,
    pub intrusiveness: u8,
    pub requires_teasing: bool,
}

impl Default for EmotionalState {
    fn default() -> Self {
        Self {
            emotion: "Normal".to_string(),
            intensity: 3,
            affection_level: 50,
            trust_level: 50,
            interaction_count: 0,
            intrusiveness: 1,
            requires_teasing: false,
        }
    }
}
