//! Transcoder seam: normalize a container for broad playback support.

mod ffmpeg;

pub use ffmpeg::FfmpegTranscoder;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Upper bound on the diagnostic text attached to a transcode failure,
/// so a chatty tool cannot blow up the job's error payload.
pub const MAX_DIAGNOSTIC_LEN: usize = 4000;

/// Errors from a transcode attempt.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The tool ran and reported failure. Diagnostic is truncated to
    /// [`MAX_DIAGNOSTIC_LEN`].
    #[error("{diagnostic}")]
    ToolFailed { diagnostic: String },

    /// The tool could not be run at all, or exceeded its time limit.
    #[error("{0}")]
    Runner(#[from] crate::runner::RunnerError),
}

/// Truncate a diagnostic to [`MAX_DIAGNOSTIC_LEN`] characters.
pub(crate) fn truncate_diagnostic(text: &str) -> String {
    text.chars().take(MAX_DIAGNOSTIC_LEN).collect()
}

/// Re-encodes the audio track of a container into a broadly supported
/// codec while copying the video stream.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Name of this transcoder implementation, for logs.
    fn name(&self) -> &str;

    async fn remux(&self, input: &Path, output: &Path) -> Result<(), TranscodeError>;
}
