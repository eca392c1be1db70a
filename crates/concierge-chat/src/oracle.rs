//! Language-model backend.
//!
//! [`LanguageModel`] is the seam the response generator talks to.
//! [`OpenAiChatModel`] implements it against any endpoint that speaks the
//! OpenAI chat-completions format.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use concierge_core::config::LlmConfig;
use concierge_core::types::ConversationTurn;

use crate::error::{ChatError, OracleError};

/// One completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ConversationTurn>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Return the assistant text for `request`. Exactly one backend call.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError>;
}

// =============================================================================
// OpenAI-compatible client
// =============================================================================

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: &'a [ConversationTurn],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Deserialize)]
struct WireMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiChatModel {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiChatModel {
    /// Build a client whose every request carries the configured timeout.
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| ChatError::ClientSetup(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: api_key.into(),
        })
    }

    fn completions_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/chat/completions")
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError> {
        let body = WireRequest {
            model: &self.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!(
            model = %self.model,
            messages = request.messages.len(),
            "sending chat completion request"
        );

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                429 => OracleError::RateLimited(body),
                401 | 403 => OracleError::AuthFailed(body),
                408 | 504 => OracleError::TimedOut,
                _ => OracleError::Unknown(format!("HTTP {status}: {body}")),
            });
        }

        let parsed: WireResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Unknown(format!("failed to parse response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OracleError::Unknown("response has no choices".into()))
    }
}
