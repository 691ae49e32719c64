//! yt-dlp backed downloader.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{DownloadError, Downloader};
use crate::registry::{DownloadRequest, MediaKind, QualityHint};
use crate::runner::ProcessRunner;

/// Target bitrate for audio extraction.
const AUDIO_QUALITY: &str = "192K";

/// Downloader that shells out to yt-dlp.
pub struct YtDlpDownloader {
    ytdlp_path: PathBuf,
    storage_dir: PathBuf,
    timeout: Duration,
    runner: Arc<dyn ProcessRunner>,
}

impl YtDlpDownloader {
    pub fn new(
        ytdlp_path: PathBuf,
        storage_dir: PathBuf,
        timeout: Duration,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            ytdlp_path,
            storage_dir,
            timeout,
            runner,
        }
    }

    /// yt-dlp format expression for a video job. Prefers an mp4/m4a pair
    /// so the merge step usually has nothing to re-encode, falling back
    /// to the best available streams.
    fn video_format(quality: QualityHint) -> String {
        match quality {
            QualityHint::MaxHeight(h) => format!(
                "bestvideo[ext=mp4][height<={0}]+bestaudio[ext=m4a]/bestvideo[height<={0}]+bestaudio",
                h
            ),
            QualityHint::Best => {
                "bestvideo[ext=mp4]+bestaudio[ext=m4a]/bestvideo+bestaudio".to_string()
            }
        }
    }

    /// Build the full argument list for one job.
    fn build_args(&self, job_id: &str, request: &DownloadRequest) -> Vec<String> {
        let output_template = self
            .storage_dir
            .join(format!("{}.%(ext)s", job_id))
            .to_string_lossy()
            .to_string();

        let mut args = Vec::new();

        match request.kind {
            MediaKind::Audio => {
                args.extend([
                    "-f".to_string(),
                    "bestaudio/best".to_string(),
                    "--extract-audio".to_string(),
                    "--audio-format".to_string(),
                    "mp3".to_string(),
                    "--audio-quality".to_string(),
                    AUDIO_QUALITY.to_string(),
                ]);
            }
            MediaKind::Video => {
                args.extend([
                    "-f".to_string(),
                    Self::video_format(request.quality),
                    "--merge-output-format".to_string(),
                    "mp4".to_string(),
                ]);
            }
        }

        args.extend([
            "--no-warnings".to_string(),
            "--no-playlist".to_string(),
            "-o".to_string(),
            output_template,
            request.url.clone(),
        ]);

        args
    }
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn fetch(&self, job_id: &str, request: &DownloadRequest) -> Result<(), DownloadError> {
        let args = self.build_args(job_id, request);
        debug!(job_id, url = %request.url, "invoking yt-dlp");

        let output = self.runner.run(&self.ytdlp_path, &args, self.timeout).await?;

        if !output.success {
            let diagnostic = if output.stderr.is_empty() {
                format!("yt-dlp exited with status {:?}", output.exit_code)
            } else {
                output.stderr
            };
            return Err(DownloadError::ToolFailed { diagnostic });
        }

        Ok(())
    }
}
