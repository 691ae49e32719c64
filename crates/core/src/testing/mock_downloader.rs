use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::downloader::{DownloadError, Downloader};
use crate::registry::DownloadRequest;

/// Scripted result of a mock fetch.
#[derive(Debug, Clone)]
pub enum MockDownloadOutcome {
    /// Write `{job_id}.{ext}` files into the storage dir and succeed.
    WriteArtifacts { extensions: Vec<String> },
    /// Succeed without writing anything (simulates a silent tool failure).
    SucceedWithoutArtifact,
    /// Fail with the given diagnostic.
    Fail { diagnostic: String },
    /// Panic inside the fetch (exercises the pipeline's fault boundary).
    Panic,
}

/// A [`Downloader`] with a scripted outcome. Tracks concurrent fetches so
/// pool-capacity tests can assert on the peak.
pub struct MockDownloader {
    storage_dir: PathBuf,
    outcome: MockDownloadOutcome,
    /// Artificial per-fetch latency, to make overlap observable.
    delay: Duration,
    running: Arc<AtomicUsize>,
    peak_running: Arc<AtomicUsize>,
    fetch_count: Arc<AtomicUsize>,
}

impl MockDownloader {
    pub fn new(storage_dir: impl Into<PathBuf>, outcome: MockDownloadOutcome) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            outcome,
            delay: Duration::ZERO,
            running: Arc::new(AtomicUsize::new(0)),
            peak_running: Arc::new(AtomicUsize::new(0)),
            fetch_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Convenience for the common case: one artifact with one extension.
    pub fn writing(storage_dir: impl Into<PathBuf>, extension: &str) -> Self {
        Self::new(
            storage_dir,
            MockDownloadOutcome::WriteArtifacts {
                extensions: vec![extension.to_string()],
            },
        )
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak_running.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Downloader for MockDownloader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, job_id: &str, _request: &DownloadRequest) -> Result<(), DownloadError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_running.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = match &self.outcome {
            MockDownloadOutcome::WriteArtifacts { extensions } => {
                let mut write_result = Ok(());
                for ext in extensions {
                    let path = self.storage_dir.join(format!("{}.{}", job_id, ext));
                    if let Err(e) = tokio::fs::write(&path, b"mock media payload").await {
                        write_result = Err(DownloadError::ToolFailed {
                            diagnostic: e.to_string(),
                        });
                        break;
                    }
                }
                write_result
            }
            MockDownloadOutcome::SucceedWithoutArtifact => Ok(()),
            MockDownloadOutcome::Fail { diagnostic } => Err(DownloadError::ToolFailed {
                diagnostic: diagnostic.clone(),
            }),
            MockDownloadOutcome::Panic => panic!("mock downloader panic"),
        };

        self.running.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
