//! Audio container conversion.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::VoiceError;

#[async_trait]
pub trait AudioConverter: Send + Sync {
    /// Convert the file at `input` into MP3 at `output`, overwriting it.
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), VoiceError>;
}

/// Runs `ffmpeg -y -i <input> -f mp3 <output>` as a child process.
pub struct FfmpegConverter {
    program: String,
    timeout: Duration,
}

impl FfmpegConverter {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl AudioConverter for FfmpegConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), VoiceError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-f", "mp3"])
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let result = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                VoiceError::Conversion(format!(
                    "{} timed out after {}s",
                    self.program,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| VoiceError::Conversion(format!("failed to run {}: {e}", self.program)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(3)..].join(" | ");
            return Err(VoiceError::Conversion(format!(
                "{} exited with {}: {tail}",
                self.program, result.status
            )));
        }

        debug!(input = %input.display(), output = %output.display(), "Audio converted");
        Ok(())
    }
}
