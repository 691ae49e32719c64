//! Downloader seam: fetch a media URL into the storage directory.

mod ytdlp;

pub use ytdlp::YtDlpDownloader;

use async_trait::async_trait;
use thiserror::Error;

use crate::registry::DownloadRequest;

/// Errors from a download attempt.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The tool ran and reported failure (non-zero exit, no matching
    /// format, etc.). Carries the tool's diagnostic output.
    #[error("{diagnostic}")]
    ToolFailed { diagnostic: String },

    /// The tool could not be run at all, or exceeded its time limit.
    #[error("{0}")]
    Runner(#[from] crate::runner::RunnerError),
}

/// Fetches media from a URL, writing artifacts named `{job_id}.{ext}`
/// into the storage directory.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Name of this downloader implementation, for logs.
    fn name(&self) -> &str;

    async fn fetch(&self, job_id: &str, request: &DownloadRequest) -> Result<(), DownloadError>;
}
