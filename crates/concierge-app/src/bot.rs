//! Telegram long-poll loop and per-update dispatch.
//!
//! Each supported update becomes one spawned task. Tasks of the same user run
//! one after another in arrival order; different users run concurrently.
//! Transport failures are logged and never stop the loop.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use concierge_chat::ChatOrchestrator;
use concierge_core::messages::Message;
use concierge_core::types::UserId;

use crate::telegram::{TelegramClient, Update};

/// Delay before polling again after a failed `getUpdates`.
const ERROR_RETRY_DELAY: Duration = Duration::from_secs(5);

/// What an inbound update asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// `/start`, with the full message text for language detection.
    Start(String),
    Text(String),
    Voice { file_id: String },
}

/// A classified update with its routing data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub chat_id: i64,
    pub user: UserId,
    pub inbound: Inbound,
}

/// Classify an update. Returns `None` for anything the bot does not handle:
/// non-message updates, media other than voice notes, and commands other
/// than `/start`.
pub fn classify_update(update: &Update) -> Option<Envelope> {
    let msg = update.message.as_ref()?;
    let chat_id = msg.chat.id;
    let user = UserId::from(msg.from.as_ref().map_or(chat_id, |u| u.id));

    let inbound = if let Some(ref voice) = msg.voice {
        debug!(
            message_id = msg.message_id,
            duration_secs = voice.duration,
            size = voice.file_size,
            "Voice note received"
        );
        Inbound::Voice {
            file_id: voice.file_id.clone(),
        }
    } else {
        let text = msg.text.as_ref()?;
        match command(text) {
            Some("/start") => Inbound::Start(text.clone()),
            Some(_) => return None,
            None => Inbound::Text(text.clone()),
        }
    };

    Some(Envelope {
        chat_id,
        user,
        inbound,
    })
}

/// The leading `/command` of `text`, without any `@botname` suffix.
fn command(text: &str) -> Option<&str> {
    let word = text.trim_start().split_whitespace().next()?;
    if !word.starts_with('/') {
        return None;
    }
    Some(word.split('@').next().unwrap_or(word))
}

/// Per-user chains of spawned tasks.
///
/// A user's new task waits for that user's previous task before it starts.
#[derive(Default)]
struct UserLanes {
    tails: HashMap<UserId, JoinHandle<()>>,
}

impl UserLanes {
    fn spawn<F>(&mut self, user: UserId, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let previous = self.tails.remove(&user);
        let handle = tokio::spawn(async move {
            if let Some(previous) = previous {
                // A panicked predecessor must not block the lane.
                if let Err(e) = previous.await {
                    warn!(error = %e, "Previous update task failed");
                }
            }
            task.await;
        });
        self.tails.insert(user, handle);
    }

    /// Forget users whose last task has finished.
    fn prune(&mut self) {
        self.tails.retain(|_, handle| !handle.is_finished());
    }
}

pub struct Bot {
    client: Arc<TelegramClient>,
    orchestrator: Arc<ChatOrchestrator>,
    poll_timeout_secs: u64,
}

impl Bot {
    pub fn new(
        client: Arc<TelegramClient>,
        orchestrator: Arc<ChatOrchestrator>,
        poll_timeout_secs: u64,
    ) -> Self {
        Self {
            client,
            orchestrator,
            poll_timeout_secs,
        }
    }

    /// Poll forever, spawning one task per supported update.
    pub async fn run(self: Arc<Self>) {
        info!(poll_timeout_secs = self.poll_timeout_secs, "Polling Telegram for updates");
        let mut offset = None;
        let mut lanes = UserLanes::default();
        loop {
            let updates = match self
                .client
                .get_updates(offset, self.poll_timeout_secs)
                .await
            {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "getUpdates failed; retrying");
                    tokio::time::sleep(ERROR_RETRY_DELAY).await;
                    continue;
                }
            };

            lanes.prune();
            for update in updates {
                offset = Some(update.update_id + 1);
                let Some(envelope) = classify_update(&update) else {
                    debug!(update_id = update.update_id, "Skipping unsupported update");
                    continue;
                };
                let bot = Arc::clone(&self);
                lanes.spawn(envelope.user.clone(), async move { bot.dispatch(envelope).await });
            }
        }
    }

    /// Handle one classified update to completion.
    pub async fn dispatch(&self, envelope: Envelope) {
        let Envelope {
            chat_id,
            user,
            inbound,
        } = envelope;

        match inbound {
            Inbound::Start(text) => {
                let reply = self.orchestrator.handle_start(&user, &text).await;
                self.send(chat_id, &reply.text, false).await;
            }
            Inbound::Text(text) => {
                self.typing(chat_id).await;
                if let Some(reply) = self.orchestrator.handle_text(&user, &text).await {
                    self.send(chat_id, &reply.text, false).await;
                }
            }
            Inbound::Voice { file_id } => {
                self.typing(chat_id).await;
                let locale = self.orchestrator.notice_locale(&user);
                self.send(chat_id, Message::VoiceProcessing.text(locale), true)
                    .await;

                let payload = match self.client.download_file(&file_id).await {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!(user = %user, error = %e, "Voice note download failed");
                        self.send(chat_id, Message::AudioFailed.text(locale), false)
                            .await;
                        return;
                    }
                };

                let reply = self.orchestrator.handle_voice(&user, &payload).await;
                self.send(chat_id, &reply.text, false).await;
            }
        }
    }

    async fn send(&self, chat_id: i64, text: &str, silent: bool) {
        if let Err(e) = self.client.send_message(chat_id, text, silent).await {
            warn!(chat_id, error = %e, "sendMessage failed");
        }
    }

    async fn typing(&self, chat_id: i64) {
        if let Err(e) = self.client.send_typing(chat_id).await {
            debug!(chat_id, error = %e, "sendChatAction failed");
        }
    }
}
