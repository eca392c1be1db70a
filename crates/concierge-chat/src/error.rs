//! Error types for the conversational core.

use concierge_core::error::ConciergeError;
use concierge_core::types::ErrorKind;

/// Failures reported by a language-model backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("authentication failed: {0}")]
    AuthFailed(String),
    #[error("request timed out")]
    TimedOut,
    #[error("oracle error: {0}")]
    Unknown(String),
}

impl OracleError {
    /// The user-facing failure category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OracleError::RateLimited(_) => ErrorKind::RateLimited,
            OracleError::AuthFailed(_) => ErrorKind::AuthFailed,
            OracleError::TimedOut => ErrorKind::TimedOut,
            OracleError::Unknown(_) => ErrorKind::UnknownOracleError,
        }
    }
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OracleError::TimedOut
        } else {
            OracleError::Unknown(err.to_string())
        }
    }
}

/// Errors from building the chat services.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("oracle client setup failed: {0}")]
    ClientSetup(String),
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl From<ChatError> for ConciergeError {
    fn from(err: ChatError) -> Self {
        ConciergeError::Chat(err.to_string())
    }
}
