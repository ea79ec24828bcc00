//! Single-attempt HTTP relay to the external chat API.

use crate::config::Config;
use crate::models::{EmotionalState, MemoryEntry};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Shown when the API answered but the reply was missing or empty.
pub const FALLBACK_REPLY: &str = "Something went wrong talking to Mai.";
/// Shown when the API could not be reached or returned a non-JSON body.
pub const TRANSPORT_ERROR_REPLY: &str = "Error reaching Mai's brain 😵‍💫";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayRequest<'a> {
    user_id: String,
    message: &'a str,
    emotional_state: EmotionalState,
    short_term_memory: Vec<MemoryEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct RelayResponse {
    message: Option<String>,
}

pub struct ChatRelay {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl ChatRelay {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            url: config.chat_api_url.clone(),
            token: config.chat_api_token.clone(),
        }
    }

    /// Forwards one user message and returns the reply text. Never fails:
    /// transport and payload problems are logged and mapped to the fixed
    /// fallback strings. One attempt per message, no retry, no timeout.
    pub async fn relay(&self, user_id: &str, text: &str, history: Vec<MemoryEntry>) -> String {
        let payload = RelayRequest {
            user_id: format!("discord:{}", user_id),
            message: text,
            emotional_state: EmotionalState::default(),
            short_term_memory: history,
        };

        match self.post(&payload).await {
            Ok(response) => reply_text(response),
            Err(e) => {
                error!("Chat API error: {}", e);
                TRANSPORT_ERROR_REPLY.to_string()
            }
        }
    }

    async fn post(&self, payload: &RelayRequest<'_>) -> Result<RelayResponse, reqwest::Error> {
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await?;
        resp.json().await
    }
}

fn reply_text(response: RelayResponse) -> String {
    response
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| FALLBACK_REPLY.to_string())
}
