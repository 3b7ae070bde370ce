//! Thin Telegram Bot API client.
//!
//! Covers exactly the three methods the bot needs: getUpdates (long
//! polling), sendMessage, and setMyCommands. Everything speaks JSON over
//! HTTPS via reqwest.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::TransportError;
use crate::query::COMMAND_SHAPES;

const BASE_URL: &str = "https://api.telegram.org";

/// Telegram caps command descriptions at 256 characters.
const MAX_DESCRIPTION: usize = 256;

/// One incoming update from getUpdates.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub edited_message: Option<Message>,
}

impl Update {
    /// The carried message, whether new or edited.
    pub fn into_message(self) -> Option<Message> {
        self.message.or(self.edited_message)
    }
}

/// An incoming chat message. Non-text messages carry no `text`.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Envelope every Bot API response comes in.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// One entry for setMyCommands.
#[derive(Debug, Serialize)]
struct BotCommand {
    command: &'static str,
    description: String,
}

/// HTTPS client for the Telegram Bot API.
#[derive(Debug, Clone)]
pub struct TelegramApi {
    http: reqwest::Client,
    base: String,
}

impl TelegramApi {
    /// Build a client for the given bot token. The HTTP timeout leaves
    /// headroom over the long-poll timeout so getUpdates can idle.
    pub fn new(token: &str, poll_timeout_secs: u64) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs + 10))
            .build()?;
        Ok(Self {
            http,
            base: format!("{BASE_URL}/bot{token}"),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: &serde_json::Value,
    ) -> Result<T, TransportError> {
        let response = self
            .http
            .post(format!("{}/{method}", self.base))
            .json(payload)
            .send()
            .await?;
        let envelope: ApiResponse<T> = response.json().await?;
        if !envelope.ok {
            return Err(TransportError::Api(
                envelope
                    .description
                    .unwrap_or_else(|| format!("{method} failed")),
            ));
        }
        envelope
            .result
            .ok_or_else(|| TransportError::Api(format!("{method}: missing result")))
    }

    /// Long-poll for updates past `offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "limit": 100,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "edited_message"],
            }),
        )
        .await
    }

    /// Send a plain-text reply to a chat.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        let _: serde_json::Value = self
            .call("sendMessage", &json!({ "chat_id": chat_id, "text": text }))
            .await?;
        Ok(())
    }

    /// Register the command menu from the grammar's shape table.
    pub async fn set_my_commands(&self) -> Result<(), TransportError> {
        let commands: Vec<BotCommand> = COMMAND_SHAPES
            .iter()
            .map(|shape| BotCommand {
                command: shape.name,
                description: shape.summary.chars().take(MAX_DESCRIPTION).collect(),
            })
            .collect();
        let _: bool = self
            .call("setMyCommands", &json!({ "commands": commands }))
            .await?;
        Ok(())
    }
}
