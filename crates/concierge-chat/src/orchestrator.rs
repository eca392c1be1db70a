//! Chat orchestrator: the request path for one inbound message.
//!
//! Wires classifier, session store, prompt assembler, response generator and
//! voice pipeline together. Each turn holds the user's session lock from the
//! first read to the last append, so one user's messages are processed one at
//! a time while different users proceed in parallel.
//!
//! The request path only reads the catalog snapshot; freshness is the
//! background refresh loop's job.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use concierge_catalog::RefreshableCache;
use concierge_core::messages::Message;
use concierge_core::types::{ConversationTurn, ErrorKind, Locale, UserId};
use concierge_voice::{VoiceOutcome, VoicePipeline};

use crate::language::classify;
use crate::prompt::PromptAssembler;
use crate::response::ResponseGenerator;
use crate::session::{SessionState, SessionStore};

/// What to send back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Set when the turn ended in a failure; `text` is then the fixed
    /// localized message for that kind.
    pub error: Option<ErrorKind>,
    pub locale: Locale,
}

impl Reply {
    fn answer(text: String, locale: Locale) -> Self {
        Self {
            text,
            error: None,
            locale,
        }
    }

    fn notice(message: Message, locale: Locale) -> Self {
        Self {
            text: message.text(locale).to_string(),
            error: None,
            locale,
        }
    }

    fn failed(kind: ErrorKind, locale: Locale) -> Self {
        Self {
            text: kind.user_message(locale).to_string(),
            error: Some(kind),
            locale,
        }
    }
}

/// Central coordinator for text, voice and start-command messages.
pub struct ChatOrchestrator {
    cache: Arc<RefreshableCache>,
    sessions: Arc<SessionStore>,
    prompts: Arc<PromptAssembler>,
    generator: Arc<ResponseGenerator>,
    voice: Arc<VoicePipeline>,
    /// Transcription hint for users whose locale is not known yet.
    default_voice_locale: Locale,
}

impl ChatOrchestrator {
    pub fn new(
        cache: Arc<RefreshableCache>,
        sessions: Arc<SessionStore>,
        prompts: Arc<PromptAssembler>,
        generator: Arc<ResponseGenerator>,
        voice: Arc<VoicePipeline>,
    ) -> Self {
        Self {
            cache,
            sessions,
            prompts,
            generator,
            voice,
            default_voice_locale: Locale::PRIMARY,
        }
    }

    pub fn with_default_voice_locale(mut self, locale: Locale) -> Self {
        self.default_voice_locale = locale;
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Locale for notices sent ahead of a turn.
    ///
    /// Never waits: if the user's session is busy with another turn, the
    /// default voice locale is returned.
    pub fn notice_locale(&self, user: &UserId) -> Locale {
        self.sessions
            .session(user)
            .try_lock()
            .ok()
            .and_then(|session| session.locale)
            .unwrap_or(self.default_voice_locale)
    }

    /// Start command: forget the conversation and greet in the detected locale.
    pub async fn handle_start(&self, user: &UserId, text: &str) -> Reply {
        let handle = self.sessions.session(user);
        let mut session = handle.lock().await;
        session.reset();

        let locale = classify(text);
        session.locale = Some(locale);
        info!(user = %user, locale = %locale, "Session started");

        Reply::notice(Message::Welcome, locale)
    }

    /// Plain text message. Blank text is ignored and yields `None`.
    pub async fn handle_text(&self, user: &UserId, text: &str) -> Option<Reply> {
        let text = text.trim();
        if text.is_empty() {
            debug!(user = %user, "Ignoring blank message");
            return None;
        }

        let handle = self.sessions.session(user);
        let mut session = handle.lock().await;
        Some(self.respond(&mut session, user, text).await)
    }

    /// Voice message: transcribe, then continue as text.
    pub async fn handle_voice(&self, user: &UserId, payload: &[u8]) -> Reply {
        let handle = self.sessions.session(user);
        let mut session = handle.lock().await;

        let hint = session.locale.unwrap_or(self.default_voice_locale);
        match self.voice.process(payload, hint).await {
            Ok(VoiceOutcome::Transcribed(text)) => self.respond(&mut session, user, &text).await,
            Ok(VoiceOutcome::EmptyTranscription) => {
                info!(user = %user, "Voice message had no recognizable speech");
                Reply::notice(Message::AudioNotUnderstood, hint)
            }
            Err(e) => {
                warn!(user = %user, error = %e, "Voice message could not be processed");
                Reply::failed(e.kind(), hint)
            }
        }
    }

    /// One text turn against a locked session.
    async fn respond(&self, session: &mut SessionState, user: &UserId, text: &str) -> Reply {
        let turn = Uuid::new_v4();

        let locale = match session.locale {
            Some(locale) => locale,
            None => {
                let locale = classify(text);
                session.locale = Some(locale);
                debug!(turn = %turn, user = %user, locale = %locale, "Locale detected");
                locale
            }
        };

        let history = session.history.clone();
        session.push(ConversationTurn::user(text));

        let snapshot = self.cache.get();
        let prompt = self.prompts.assemble(locale, &snapshot);

        match self.generator.generate(&prompt, &history, text).await {
            Ok(answer) => {
                session.push(ConversationTurn::assistant(answer.clone()));
                info!(
                    turn = %turn,
                    user = %user,
                    locale = %locale,
                    generation = snapshot.generation,
                    "Turn answered"
                );
                Reply::answer(answer, locale)
            }
            Err(kind) => {
                warn!(turn = %turn, user = %user, locale = %locale, kind = %kind, "Turn failed");
                Reply::failed(kind, locale)
            }
        }
    }
}
