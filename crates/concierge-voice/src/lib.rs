//! Voice message handling: format conversion, transcription, and the
//! pipeline that ties them together.
//!
//! Every collaborator sits behind a trait so the pipeline can be exercised
//! with in-process fakes; production uses `ffmpeg` and an OpenAI-compatible
//! transcription endpoint.

pub mod convert;
pub mod error;
pub mod pipeline;
pub mod whisper;

pub use convert::{AudioConverter, FfmpegConverter};
pub use error::VoiceError;
pub use pipeline::{VoiceOutcome, VoicePipeline, VoiceStage};
pub use whisper::{Transcriber, WhisperApiTranscriber};
