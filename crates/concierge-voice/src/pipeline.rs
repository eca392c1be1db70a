//! Voice message pipeline.
//!
//! One invocation walks the stages in order and stops at the first failure:
//! - Received -> Downloaded (payload written to a temp file)
//! - Downloaded -> Converted (MP3 produced in a second temp file)
//! - Converted -> Transcribed (text obtained from the transcriber)
//! - Transcribed -> Delivered (text handed back to the caller)
//!
//! Both temp files are owned by the invocation and removed on every exit
//! path, including early returns and panics.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use concierge_core::types::Locale;

use crate::convert::AudioConverter;
use crate::error::VoiceError;
use crate::whisper::Transcriber;

/// Progress of one voice message through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceStage {
    Received,
    Downloaded,
    Converted,
    Transcribed,
    Delivered,
}

impl fmt::Display for VoiceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceStage::Received => write!(f, "Received"),
            VoiceStage::Downloaded => write!(f, "Downloaded"),
            VoiceStage::Converted => write!(f, "Converted"),
            VoiceStage::Transcribed => write!(f, "Transcribed"),
            VoiceStage::Delivered => write!(f, "Delivered"),
        }
    }
}

/// Successful end states of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceOutcome {
    /// Non-blank text, trimmed.
    Transcribed(String),
    /// The transcriber returned only whitespace. Not an error.
    EmptyTranscription,
}

/// Temp files of one invocation. Dropping it deletes them.
struct Artifacts {
    raw: NamedTempFile,
    converted: NamedTempFile,
}

impl Drop for Artifacts {
    fn drop(&mut self) {
        debug!(
            raw = %self.raw.path().display(),
            converted = %self.converted.path().display(),
            "Releasing voice temp files"
        );
    }
}

pub struct VoicePipeline {
    converter: Arc<dyn AudioConverter>,
    transcriber: Arc<dyn Transcriber>,
    work_dir: PathBuf,
}

impl VoicePipeline {
    pub fn new(
        converter: Arc<dyn AudioConverter>,
        transcriber: Arc<dyn Transcriber>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            converter,
            transcriber,
            work_dir: work_dir.into(),
        }
    }

    /// Run one voice payload (an OGG/Opus voice note) through the pipeline.
    pub async fn process(
        &self,
        payload: &[u8],
        language: Locale,
    ) -> Result<VoiceOutcome, VoiceError> {
        let mut stage = VoiceStage::Received;
        let result = self.run(payload, language, &mut stage).await;

        match &result {
            Ok(VoiceOutcome::Transcribed(text)) => {
                info!(stage = %stage, chars = text.chars().count(), "Voice message transcribed")
            }
            Ok(VoiceOutcome::EmptyTranscription) => {
                info!(stage = %stage, "Voice message contained no speech")
            }
            Err(e) => warn!(stage = %stage, error = %e, "Voice pipeline failed"),
        }
        result
    }

    async fn run(
        &self,
        payload: &[u8],
        language: Locale,
        stage: &mut VoiceStage,
    ) -> Result<VoiceOutcome, VoiceError> {
        tokio::fs::create_dir_all(&self.work_dir).await?;
        let artifacts = Artifacts {
            raw: tempfile::Builder::new()
                .prefix("voice-")
                .suffix(".ogg")
                .tempfile_in(&self.work_dir)?,
            converted: tempfile::Builder::new()
                .prefix("voice-")
                .suffix(".mp3")
                .tempfile_in(&self.work_dir)?,
        };

        tokio::fs::write(artifacts.raw.path(), payload).await?;
        *stage = VoiceStage::Downloaded;

        self.converter
            .convert(artifacts.raw.path(), artifacts.converted.path())
            .await?;
        *stage = VoiceStage::Converted;

        let text = self
            .transcriber
            .transcribe(artifacts.converted.path(), language)
            .await?;
        *stage = VoiceStage::Transcribed;

        let text = text.trim();
        let outcome = if text.is_empty() {
            VoiceOutcome::EmptyTranscription
        } else {
            VoiceOutcome::Transcribed(text.to_string())
        };
        *stage = VoiceStage::Delivered;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    /// Copies input to output, or fails when asked to.
    struct FakeConverter {
        fail: bool,
        seen: Mutex<Vec<PathBuf>>,
    }

    #[async_trait]
    impl AudioConverter for FakeConverter {
        async fn convert(&self, input: &Path, output: &Path) -> Result<(), VoiceError> {
            self.seen.lock().unwrap().push(input.to_path_buf());
            if self.fail {
                return Err(VoiceError::Conversion("corrupt container".into()));
            }
            std::fs::copy(input, output)?;
            Ok(())
        }
    }

    /// Returns a scripted transcript and counts calls.
    struct FakeTranscriber {
        result: Result<String, String>,
        calls: AtomicUsize,
        last_language: Mutex<Option<Locale>>,
    }

    #[async_trait]
    impl Transcriber for FakeTranscriber {
        async fn transcribe(&self, audio: &Path, language: Locale) -> Result<String, VoiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_language.lock().unwrap() = Some(language);
            assert!(audio.exists(), "converted file must exist during transcription");
            assert_eq!(audio.extension().and_then(|e| e.to_str()), Some("mp3"));
            self.result.clone().map_err(VoiceError::Transcription)
        }
    }

    struct Harness {
        dir: tempfile::TempDir,
        converter: Arc<FakeConverter>,
        transcriber: Arc<FakeTranscriber>,
        pipeline: VoicePipeline,
    }

    fn harness(convert_fails: bool, transcript: Result<&str, &str>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let converter = Arc::new(FakeConverter {
            fail: convert_fails,
            seen: Mutex::new(Vec::new()),
        });
        let transcriber = Arc::new(FakeTranscriber {
            result: transcript.map(str::to_string).map_err(str::to_string),
            calls: AtomicUsize::new(0),
            last_language: Mutex::new(None),
        });
        let pipeline = VoicePipeline::new(
            Arc::clone(&converter) as Arc<dyn AudioConverter>,
            Arc::clone(&transcriber) as Arc<dyn Transcriber>,
            dir.path().join("work"),
        );
        Harness {
            dir,
            converter,
            transcriber,
            pipeline,
        }
    }

    fn leftover_files(h: &Harness) -> usize {
        std::fs::read_dir(h.dir.path().join("work"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_happy_path_delivers_trimmed_text() {
        let h = harness(false, Ok("  Сколько стоит курс?  "));
        let outcome = h.pipeline.process(b"OggS-payload", Locale::Russian).await.unwrap();

        assert_eq!(
            outcome,
            VoiceOutcome::Transcribed("Сколько стоит курс?".to_string())
        );
        assert_eq!(h.transcriber.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            *h.transcriber.last_language.lock().unwrap(),
            Some(Locale::Russian)
        );
        assert_eq!(leftover_files(&h), 0);
    }

    #[tokio::test]
    async fn test_conversion_failure_skips_transcription_and_cleans_up() {
        let h = harness(true, Ok("never"));
        let err = h
            .pipeline
            .process(b"garbage", Locale::Kyrgyz)
            .await
            .unwrap_err();

        assert!(matches!(err, VoiceError::Conversion(_)));
        assert_eq!(h.transcriber.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.converter.seen.lock().unwrap().len(), 1);
        assert_eq!(leftover_files(&h), 0);
    }

    #[tokio::test]
    async fn test_transcription_failure_cleans_up() {
        let h = harness(false, Err("HTTP 500"));
        let err = h
            .pipeline
            .process(b"OggS", Locale::Russian)
            .await
            .unwrap_err();

        assert!(matches!(err, VoiceError::Transcription(_)));
        assert_eq!(leftover_files(&h), 0);
    }

    #[tokio::test]
    async fn test_whitespace_transcript_is_empty_outcome() {
        let h = harness(false, Ok(" \n\t "));
        let outcome = h.pipeline.process(b"OggS", Locale::Kyrgyz).await.unwrap();
        assert_eq!(outcome, VoiceOutcome::EmptyTranscription);
        assert_eq!(leftover_files(&h), 0);
    }

    #[tokio::test]
    async fn test_payload_reaches_converter_as_ogg_file() {
        let h = harness(false, Ok("ok"));
        h.pipeline.process(b"OggS", Locale::Russian).await.unwrap();
        let seen = h.converter.seen.lock().unwrap();
        assert_eq!(seen[0].extension().and_then(|e| e.to_str()), Some("ogg"));
        // Removed once the invocation finished.
        assert!(!seen[0].exists());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(VoiceStage::Converted.to_string(), "Converted");
        assert_eq!(VoiceStage::Delivered.to_string(), "Delivered");
    }
}
