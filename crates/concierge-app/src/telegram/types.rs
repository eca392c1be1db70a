//! Telegram Bot API types.
//!
//! Only the fields the bot reads or writes are modelled; everything else in
//! the payloads is ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Envelope of every Bot API response: `{ ok, result?, description? }`.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    /// Error text, present when `ok` is `false`.
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonically increasing; the next poll offset is the last id plus one.
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    /// Absent for channel posts.
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    pub voice: Option<Voice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// A voice note (OGG/Opus).
#[derive(Debug, Clone, Deserialize)]
pub struct Voice {
    pub file_id: String,
    #[serde(default)]
    pub duration: u32,
    pub file_size: Option<u64>,
}

/// Result of `getFile`. `file_path` is what the download URL is built from.
#[derive(Debug, Clone, Deserialize)]
pub struct File {
    pub file_size: Option<u64>,
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// Long-poll timeout in seconds.
    pub timeout: u64,
    pub allowed_updates: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub chat_id: i64,
    pub text: String,
    /// Deliver without a notification sound.
    #[serde(skip_serializing_if = "is_false")]
    pub disable_notification: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatActionRequest {
    pub chat_id: i64,
    pub action: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetFileRequest {
    pub file_id: String,
}
