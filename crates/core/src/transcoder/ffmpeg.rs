//! ffmpeg backed transcoder.
//!
//! Only the audio track is re-encoded (to AAC at a fixed bitrate); the
//! video stream is stream-copied, which keeps the remux cheap and
//! lossless for the picture.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{truncate_diagnostic, TranscodeError, Transcoder};
use crate::runner::ProcessRunner;

/// Target bitrate for the re-encoded audio track.
const AUDIO_BITRATE: &str = "192k";

/// Transcoder that shells out to ffmpeg.
pub struct FfmpegTranscoder {
    ffmpeg_path: PathBuf,
    timeout: Duration,
    runner: Arc<dyn ProcessRunner>,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: PathBuf, timeout: Duration, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            ffmpeg_path,
            timeout,
            runner,
        }
    }

    fn build_args(input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-c:v".to_string(),
            "copy".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            AUDIO_BITRATE.to_string(),
            output.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn remux(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        let args = Self::build_args(input, output);
        debug!(input = %input.display(), output = %output.display(), "invoking ffmpeg");

        let result = self.runner.run(&self.ffmpeg_path, &args, self.timeout).await?;

        if !result.success {
            let diagnostic = if result.stderr.is_empty() {
                format!("ffmpeg exited with status {:?}", result.exit_code)
            } else {
                truncate_diagnostic(&result.stderr)
            };
            return Err(TranscodeError::ToolFailed { diagnostic });
        }

        Ok(())
    }
}
