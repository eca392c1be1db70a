//! Speech-to-text backends.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use concierge_core::config::VoiceConfig;
use concierge_core::types::Locale;

use crate::error::VoiceError;

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the MP3 file at `audio`, hinting the spoken `language`.
    async fn transcribe(&self, audio: &Path, language: Locale) -> Result<String, VoiceError>;
}

/// OpenAI-compatible `/audio/transcriptions` client.
///
/// Uploads the file as multipart form data and asks for a plain-text
/// response.
pub struct WhisperApiTranscriber {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl WhisperApiTranscriber {
    pub fn new(config: &VoiceConfig, api_key: impl Into<String>) -> Result<Self, VoiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: api_key.into(),
        })
    }

    fn transcriptions_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/audio/transcriptions")
    }
}

#[async_trait]
impl Transcriber for WhisperApiTranscriber {
    async fn transcribe(&self, audio: &Path, language: Locale) -> Result<String, VoiceError> {
        let bytes = tokio::fs::read(audio)
            .await
            .map_err(|e| VoiceError::Transcription(format!("cannot read audio: {e}")))?;
        let size = bytes.len();

        let file_part = reqwest::multipart::Part::bytes(bytes)
            .file_name("voice.mp3")
            .mime_str("audio/mpeg")
            .map_err(|e| VoiceError::Transcription(format!("MIME error: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("language", language.code())
            .text("response_format", "text");

        debug!(bytes = size, language = %language, "Sending transcription request");

        let response = self
            .http
            .post(self.transcriptions_url())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(VoiceError::Transcription(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }
}
