//! Per-user conversation memory.
//!
//! Each user's state sits behind its own async mutex. The outer map lock is
//! held only long enough to find or insert a session, so appends for one user
//! never wait on another user's turn.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;

use concierge_core::types::{ConversationTurn, Locale, Role, UserId};

// =============================================================================
// SessionState
// =============================================================================

/// Conversation memory for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Sticky once set; cleared only by [`reset`](Self::reset).
    pub locale: Option<Locale>,
    /// User and assistant turns, oldest first. Never holds a system turn.
    pub history: Vec<ConversationTurn>,
    /// Maximum length of `history`.
    pub bound: usize,
}

impl SessionState {
    pub fn new(bound: usize) -> Self {
        Self {
            locale: None,
            history: Vec::new(),
            bound,
        }
    }

    /// Append a turn, evicting the oldest turns beyond the bound.
    ///
    /// System turns are dropped; the grounding prompt is rebuilt every turn.
    pub fn push(&mut self, turn: ConversationTurn) {
        if turn.role == Role::System {
            return;
        }
        self.history.push(turn);
        if self.history.len() > self.bound {
            let excess = self.history.len() - self.bound;
            self.history.drain(..excess);
        }
    }

    pub fn reset(&mut self) {
        self.locale = None;
        self.history.clear();
    }
}

/// Exclusive access to one user's session for the duration of a turn.
pub type SessionHandle = Arc<Mutex<SessionState>>;

// =============================================================================
// SessionStore
// =============================================================================

/// All live sessions, keyed by user. Sessions are created on first contact
/// and live for the lifetime of the process.
pub struct SessionStore {
    bound: usize,
    sessions: RwLock<HashMap<UserId, SessionHandle>>,
}

impl SessionStore {
    pub fn new(bound: usize) -> Self {
        Self {
            bound,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// The user's session, created empty if absent.
    pub fn session(&self, user: &UserId) -> SessionHandle {
        if let Some(handle) = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user)
        {
            return Arc::clone(handle);
        }

        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            sessions
                .entry(user.clone())
                .or_insert_with(|| Arc::new(Mutex::new(SessionState::new(self.bound)))),
        )
    }

    pub async fn append(&self, user: &UserId, turn: ConversationTurn) {
        self.session(user).lock().await.push(turn);
    }

    /// A copy of the user's current state.
    pub async fn get(&self, user: &UserId) -> SessionState {
        self.session(user).lock().await.clone()
    }

    pub async fn set_locale(&self, user: &UserId, locale: Locale) {
        self.session(user).lock().await.locale = Some(locale);
    }

    pub async fn reset(&self, user: &UserId) {
        self.session(user).lock().await.reset();
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
