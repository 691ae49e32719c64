//! Mock implementations of the external-process seams, for tests that
//! exercise the pipeline without yt-dlp or ffmpeg installed.

mod mock_downloader;
mod mock_runner;
mod mock_transcoder;

pub use mock_downloader::{MockDownloadOutcome, MockDownloader};
pub use mock_runner::{Invocation, MockProcessRunner};
pub use mock_transcoder::MockTranscoder;
