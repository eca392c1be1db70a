use concierge_core::error::ConciergeError;
use concierge_core::types::ErrorKind;

/// Errors from the voice pipeline.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("conversion failed: {0}")]
    Conversion(String),
    #[error("transcription failed: {0}")]
    Transcription(String),
    #[error("temporary file error: {0}")]
    Io(#[from] std::io::Error),
}

impl VoiceError {
    /// The user-facing failure category.
    ///
    /// Temp-file failures happen before or during conversion, so they are
    /// reported as conversion errors.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VoiceError::Conversion(_) | VoiceError::Io(_) => ErrorKind::ConversionError,
            VoiceError::Transcription(_) => ErrorKind::TranscriptionError,
        }
    }
}

impl From<reqwest::Error> for VoiceError {
    fn from(err: reqwest::Error) -> Self {
        VoiceError::Transcription(err.to_string())
    }
}

impl From<VoiceError> for ConciergeError {
    fn from(err: VoiceError) -> Self {
        ConciergeError::Voice(err.to_string())
    }
}
