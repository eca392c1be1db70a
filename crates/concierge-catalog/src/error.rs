//! Error types for catalog fetches.

use concierge_core::error::ConciergeError;
use concierge_core::types::Locale;

/// Failure to obtain a complete catalog from the remote store.
///
/// Cloneable so that one refresh result can be handed to every caller that
/// queued behind the in-flight refresh.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("gateway not configured: {0}")]
    NotConfigured(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("knowledge text for {locale} unavailable: {reason}")]
    Knowledge { locale: Locale, reason: String },
    #[error("catalog is empty: no courses and no knowledge text")]
    EmptyCatalog,
}

/// The request URL carries the API key, so it is dropped from the message.
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Request(err.without_url().to_string())
    }
}

impl From<FetchError> for ConciergeError {
    fn from(err: FetchError) -> Self {
        ConciergeError::Catalog(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
