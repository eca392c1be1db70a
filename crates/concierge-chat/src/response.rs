//! Response generation against the language model.
//!
//! Builds the message list for one turn, calls the model once, and maps any
//! failure to an [`ErrorKind`]. The session is never touched here; the caller
//! decides what to append.

use std::sync::Arc;

use tracing::{debug, warn};

use concierge_core::config::LlmConfig;
use concierge_core::types::{ConversationTurn, ErrorKind};

use crate::error::OracleError;
use crate::oracle::{CompletionRequest, LanguageModel};
use crate::prompt::PromptContext;

pub struct ResponseGenerator {
    model: Arc<dyn LanguageModel>,
    /// Trailing history turns sent with each request.
    pub history_window: usize,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ResponseGenerator {
    pub fn new(model: Arc<dyn LanguageModel>, config: &LlmConfig) -> Self {
        Self {
            model,
            history_window: config.history_window,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// System prompt, then the last `history_window` turns, then the new
    /// user message.
    pub fn build_request(
        &self,
        prompt: &PromptContext,
        history: &[ConversationTurn],
        user_message: &str,
    ) -> CompletionRequest {
        let start = history.len().saturating_sub(self.history_window);
        let mut messages = Vec::with_capacity(history.len() - start + 2);
        messages.push(ConversationTurn::system(prompt.system_prompt.clone()));
        messages.extend_from_slice(&history[start..]);
        messages.push(ConversationTurn::user(user_message));

        CompletionRequest {
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    pub async fn generate(
        &self,
        prompt: &PromptContext,
        history: &[ConversationTurn],
        user_message: &str,
    ) -> Result<String, ErrorKind> {
        let request = self.build_request(prompt, history, user_message);
        debug!(
            locale = %prompt.locale,
            messages = request.messages.len(),
            "Generating response"
        );

        let text = self.model.complete(&request).await.map_err(|e| {
            warn!(error = %e, kind = %e.kind(), "Language model call failed");
            e.kind()
        })?;

        let text = text.trim();
        if text.is_empty() {
            warn!("Language model returned an empty completion");
            return Err(OracleError::Unknown("empty completion".into()).kind());
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use concierge_core::types::{Locale, Role};

    /// Returns a scripted result and records every request.
    struct ScriptedModel {
        result: Result<String, OracleError>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedModel {
        fn new(result: Result<String, OracleError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError> {
            self.requests.lock().unwrap().push(request.clone());
            self.result.clone()
        }
    }

    fn prompt() -> PromptContext {
        PromptContext {
            locale: Locale::Russian,
            system_prompt: "SYSTEM".to_string(),
            course_count: 1,
        }
    }

    fn generator(model: Arc<ScriptedModel>, window: usize) -> ResponseGenerator {
        let config = LlmConfig {
            history_window: window,
            ..LlmConfig::default()
        };
        ResponseGenerator::new(model, &config)
    }

    fn history(n: usize) -> Vec<ConversationTurn> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    ConversationTurn::user(format!("q{i}"))
                } else {
                    ConversationTurn::assistant(format!("a{i}"))
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn test_request_layout_and_window() {
        let model = ScriptedModel::new(Ok("ok".into()));
        let gen = generator(Arc::clone(&model), 3);

        gen.generate(&prompt(), &history(6), "new").await.unwrap();

        let requests = model.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let msgs = &requests[0].messages;
        assert_eq!(msgs.len(), 5);
        assert_eq!(msgs[0].role, Role::System);
        assert_eq!(msgs[0].content, "SYSTEM");
        // Most recent three history turns, oldest first.
        assert_eq!(msgs[1].content, "a3");
        assert_eq!(msgs[2].content, "q4");
        assert_eq!(msgs[3].content, "a5");
        assert_eq!(msgs[4], ConversationTurn::user("new"));
        assert_eq!(requests[0].max_tokens, 500);
    }

    #[tokio::test]
    async fn test_short_history_is_sent_whole() {
        let model = ScriptedModel::new(Ok("ok".into()));
        let gen = generator(Arc::clone(&model), 10);
        gen.generate(&prompt(), &history(2), "new").await.unwrap();
        assert_eq!(model.requests.lock().unwrap()[0].messages.len(), 4);
    }

    #[tokio::test]
    async fn test_failures_map_to_kinds() {
        let cases = [
            (OracleError::RateLimited("429".into()), ErrorKind::RateLimited),
            (OracleError::AuthFailed("401".into()), ErrorKind::AuthFailed),
            (OracleError::TimedOut, ErrorKind::TimedOut),
            (OracleError::Unknown("500".into()), ErrorKind::UnknownOracleError),
        ];
        for (err, kind) in cases {
            let model = ScriptedModel::new(Err(err));
            let gen = generator(Arc::clone(&model), 10);
            assert_eq!(gen.generate(&prompt(), &[], "hi").await, Err(kind));
            // Exactly one call, no retry.
            assert_eq!(model.requests.lock().unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_blank_completion_is_unknown_error() {
        let model = ScriptedModel::new(Ok("  \n".into()));
        let gen = generator(model, 10);
        assert_eq!(
            gen.generate(&prompt(), &[], "hi").await,
            Err(ErrorKind::UnknownOracleError)
        );
    }

    #[tokio::test]
    async fn test_completion_is_trimmed() {
        let model = ScriptedModel::new(Ok("  Здравствуйте!\n".into()));
        let gen = generator(model, 10);
        assert_eq!(
            gen.generate(&prompt(), &[], "hi").await.unwrap(),
            "Здравствуйте!"
        );
    }
}
