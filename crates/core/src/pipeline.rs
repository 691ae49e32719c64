//! The per-job pipeline: download, locate the artifact, normalize the
//! container when needed, and commit exactly one terminal state.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::downloader::Downloader;
use crate::locator::ArtifactLocator;
use crate::pool::WorkerPool;
use crate::registry::{DownloadRequest, JobRegistry, MediaKind};
use crate::transcoder::Transcoder;

/// Canonical message for a download that reported success but left no
/// artifact behind. Guards against silent tool failures.
const MISSING_ARTIFACT_ERROR: &str = "Download finished but output file missing";

/// Container extensions that play poorly on common desktop targets and
/// get remuxed to mp4.
const REMUX_EXTENSIONS: [&str; 2] = ["webm", "mkv"];

/// Why a pipeline run failed. Rendered into the job's terminal error.
#[derive(Debug, Error)]
enum PipelineError {
    #[error("{0}")]
    Download(String),

    #[error("{}", MISSING_ARTIFACT_ERROR)]
    MissingArtifact,

    #[error("ffmpeg transcode failed: {0}")]
    Transcode(String),

    #[error("Failed to scan storage directory: {0}")]
    Storage(#[from] std::io::Error),
}

/// Drives jobs from submission to a terminal registry state.
pub struct JobPipeline {
    registry: Arc<JobRegistry>,
    downloader: Arc<dyn Downloader>,
    transcoder: Arc<dyn Transcoder>,
    locator: ArtifactLocator,
    pool: WorkerPool,
}

impl JobPipeline {
    pub fn new(
        registry: Arc<JobRegistry>,
        downloader: Arc<dyn Downloader>,
        transcoder: Arc<dyn Transcoder>,
        locator: ArtifactLocator,
        pool: WorkerPool,
    ) -> Self {
        Self {
            registry,
            downloader,
            transcoder,
            locator,
            pool,
        }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Register a job and enqueue its pipeline run. Returns the new job id
    /// immediately; the outcome is observable only through the registry.
    pub async fn submit(&self, request: DownloadRequest) -> String {
        let job = self.registry.create(request.clone()).await;
        let job_id = job.id.clone();
        info!(job_id = %job_id, url = %request.url, kind = ?request.kind, "job submitted");

        let registry = Arc::clone(&self.registry);
        let downloader = Arc::clone(&self.downloader);
        let transcoder = Arc::clone(&self.transcoder);
        let locator = self.locator.clone();
        let id = job_id.clone();

        self.pool.spawn(async move {
            // Run the steps on a task of their own so a panic surfaces as
            // a JoinError here instead of tearing down the worker, and the
            // job still reaches a terminal state.
            let steps = tokio::spawn(Self::run_steps(
                id.clone(),
                request,
                downloader,
                transcoder,
                locator,
            ));

            let outcome = match steps.await {
                Ok(Ok(filename)) => registry.set_done(&id, filename).await,
                Ok(Err(e)) => registry.set_failed(&id, e.to_string()).await,
                Err(join_err) => {
                    warn!(job_id = %id, error = %join_err, "pipeline task aborted");
                    registry
                        .set_failed(&id, format!("Internal fault: {}", join_err))
                        .await
                }
            };

            if let Err(e) = outcome {
                // Only reachable if something else wrote a terminal state,
                // which the registry forbids; log rather than crash.
                warn!(job_id = %id, error = %e, "failed to commit terminal state");
            }
        });

        job_id
    }

    /// The sequential steps of one run. Every error path maps to a
    /// terminal failure message; success returns the final artifact name.
    async fn run_steps(
        job_id: String,
        request: DownloadRequest,
        downloader: Arc<dyn Downloader>,
        transcoder: Arc<dyn Transcoder>,
        locator: ArtifactLocator,
    ) -> Result<String, PipelineError> {
        downloader
            .fetch(&job_id, &request)
            .await
            .map_err(|e| PipelineError::Download(e.to_string()))?;

        let filename = locator
            .locate(&job_id)
            .await?
            .ok_or(PipelineError::MissingArtifact)?;
        info!(job_id = %job_id, artifact = %filename, "artifact located");

        let filename = if request.kind == MediaKind::Video && needs_remux(&filename) {
            Self::remux_artifact(&job_id, &filename, transcoder.as_ref(), &locator).await?
        } else {
            filename
        };

        info!(job_id = %job_id, filename = %filename, "job done");
        Ok(filename)
    }

    /// Remux a poorly supported container to `{job_id}.mp4`, then delete
    /// the original. Deletion is best-effort; the remuxed file is the
    /// job's result either way.
    async fn remux_artifact(
        job_id: &str,
        filename: &str,
        transcoder: &dyn Transcoder,
        locator: &ArtifactLocator,
    ) -> Result<String, PipelineError> {
        let input = locator.storage_dir().join(filename);
        let output_name = format!("{}.mp4", job_id);
        let output = locator.storage_dir().join(&output_name);
        info!(job_id = %job_id, input = %filename, "remuxing for compatibility");

        transcoder
            .remux(&input, &output)
            .await
            .map_err(|e| PipelineError::Transcode(e.to_string()))?;

        if let Err(e) = tokio::fs::remove_file(&input).await {
            warn!(job_id = %job_id, file = %filename, error = %e, "failed to delete superseded artifact");
        }

        Ok(output_name)
    }
}

/// Whether an artifact's extension marks it for remuxing.
fn needs_remux(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    REMUX_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}
