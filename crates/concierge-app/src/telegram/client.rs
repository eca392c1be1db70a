//! HTTP client for the Telegram Bot API.
//!
//! Every method is a JSON `POST` to `{api_base}/bot{token}/{method}`; file
//! downloads are a `GET` under `{api_base}/file/bot{token}/`. The token is
//! part of every URL, so URLs are stripped from errors and never logged.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace};

use super::types::{
    ChatActionRequest, File, GetFileRequest, GetUpdatesRequest, Message, SendMessageRequest,
    TelegramResponse, Update, User,
};

/// Added on top of the long-poll timeout for the HTTP client deadline.
const REQUEST_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Telegram unreachable: {0}")]
    Connection(String),

    /// The Bot API answered `ok: false` or an unreadable body.
    #[error("Telegram API error: {0}")]
    Api(String),

    #[error("File download failed: {0}")]
    Download(String),
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        TelegramError::Connection(err.without_url().to_string())
    }
}

pub struct TelegramClient {
    http: Client,
    /// `{api_base}/bot{token}`
    base_url: String,
    /// `{api_base}/file/bot{token}`
    file_url: String,
}

impl TelegramClient {
    pub fn new(api_base: &str, token: &str, poll_timeout: Duration) -> Result<Self, TelegramError> {
        let api_base = api_base.trim_end_matches('/');
        let http = Client::builder()
            .timeout(poll_timeout + REQUEST_GRACE)
            .build()?;
        Ok(Self {
            http,
            base_url: format!("{api_base}/bot{token}"),
            file_url: format!("{api_base}/file/bot{token}"),
        })
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        trace!(method, "Calling Bot API");
        let resp = self
            .http
            .post(format!("{}/{method}", self.base_url))
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let body: TelegramResponse<T> = resp.json().await.map_err(|e| {
            TelegramError::Api(format!("{method}: HTTP {status}: {}", e.without_url()))
        })?;

        if !body.ok {
            let desc = body
                .description
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(TelegramError::Api(format!("{method}: {desc}")));
        }
        body.result
            .ok_or_else(|| TelegramError::Api(format!("{method}: missing result")))
    }

    /// Verify the token. Returns the bot's own account.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Long-poll for new updates starting at `offset`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let req = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: vec!["message".to_string()],
        };
        let updates: Vec<Update> = self.call("getUpdates", &req).await?;
        if !updates.is_empty() {
            debug!(count = updates.len(), "Received updates");
        }
        Ok(updates)
    }

    /// Send plain text. `silent` suppresses the notification sound.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        silent: bool,
    ) -> Result<Message, TelegramError> {
        let req = SendMessageRequest {
            chat_id,
            text: text.to_string(),
            disable_notification: silent,
        };
        self.call("sendMessage", &req).await
    }

    /// Show the "typing…" indicator in the chat.
    pub async fn send_typing(&self, chat_id: i64) -> Result<(), TelegramError> {
        let req = ChatActionRequest {
            chat_id,
            action: "typing".to_string(),
        };
        let _: bool = self.call("sendChatAction", &req).await?;
        Ok(())
    }

    /// Resolve a file id and download its bytes.
    pub async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, TelegramError> {
        let req = GetFileRequest {
            file_id: file_id.to_string(),
        };
        let file: File = self.call("getFile", &req).await?;
        let path = file
            .file_path
            .ok_or_else(|| TelegramError::Download("getFile returned no file_path".into()))?;

        let resp = self
            .http
            .get(format!("{}/{path}", self.file_url))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TelegramError::Download(format!("HTTP {status}")));
        }
        let bytes = resp.bytes().await?;
        debug!(
            bytes = bytes.len(),
            reported = file.file_size,
            "Downloaded file"
        );
        Ok(bytes.to_vec())
    }
}
