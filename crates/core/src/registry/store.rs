use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::types::{DownloadRequest, Job, JobStatus};

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Job not found: {0}")]
    NotFound(String),

    /// A terminal setter was called on a job that already reached a
    /// terminal state. Terminal transitions are write-once.
    #[error("Job {0} is already in a terminal state")]
    AlreadyTerminal(String),
}

/// Concurrency-safe registry of all jobs.
///
/// Readers (status polls) and the single terminal writer (the worker
/// owning the job) synchronize on the inner lock; a `get` never observes
/// a partially written entry.
#[derive(Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<String, Job>>,
}

impl JobRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert a new `Processing` entry with a freshly generated id and
    /// return it. UUIDv4 collision probability is low enough to ignore.
    pub async fn create(&self, request: DownloadRequest) -> Job {
        let job = Job {
            id: Uuid::new_v4().to_string(),
            request,
            status: JobStatus::Processing,
            created_at: Utc::now(),
        };

        let mut jobs = self.jobs.write().await;
        jobs.insert(job.id.clone(), job.clone());
        job
    }

    /// Snapshot of a job by id.
    pub async fn get(&self, id: &str) -> Option<Job> {
        let jobs = self.jobs.read().await;
        jobs.get(id).cloned()
    }

    /// Commit a successful terminal state.
    pub async fn set_done(&self, id: &str, filename: String) -> Result<(), RegistryError> {
        self.transition(id, JobStatus::Done { filename }).await
    }

    /// Commit a failed terminal state.
    pub async fn set_failed(&self, id: &str, error: String) -> Result<(), RegistryError> {
        self.transition(id, JobStatus::Failed { error }).await
    }

    async fn transition(&self, id: &str, status: JobStatus) -> Result<(), RegistryError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;

        if job.status.is_terminal() {
            return Err(RegistryError::AlreadyTerminal(id.to_string()));
        }

        job.status = status;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::QualityHint;

    fn request() -> DownloadRequest {
        DownloadRequest::video("https://example.com/watch?v=x", QualityHint::Best)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let registry = JobRegistry::new();
        let job = registry.create(request()).await;

        let fetched = registry.get(&job.id).await.unwrap();
        assert_eq!(fetched.id, job.id);
        assert_eq!(fetched.status, JobStatus::Processing);
    }

    #[tokio::test]
    async fn test_get_unknown_id() {
        let registry = JobRegistry::new();
        assert!(registry.get("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_set_done() {
        let registry = JobRegistry::new();
        let job = registry.create(request()).await;

        registry
            .set_done(&job.id, format!("{}.mp4", job.id))
            .await
            .unwrap();

        let fetched = registry.get(&job.id).await.unwrap();
        assert_eq!(
            fetched.status,
            JobStatus::Done {
                filename: format!("{}.mp4", job.id)
            }
        );
    }

    #[tokio::test]
    async fn test_terminal_transition_is_write_once() {
        let registry = JobRegistry::new();
        let job = registry.create(request()).await;

        registry
            .set_failed(&job.id, "yt-dlp exited with status 1".to_string())
            .await
            .unwrap();

        let err = registry
            .set_done(&job.id, "late.mp4".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyTerminal(_)));

        // The first terminal state sticks.
        let fetched = registry.get(&job.id).await.unwrap();
        assert!(matches!(fetched.status, JobStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn test_transition_unknown_id() {
        let registry = JobRegistry::new();
        let err = registry
            .set_done("missing", "x.mp4".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_reads_during_write() {
        let registry = JobRegistry::new();
        let job = registry.create(request()).await;

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            let id = job.id.clone();
            handles.push(tokio::spawn(async move {
                let job = registry.get(&id).await.unwrap();
                // Either state is fine, but never a torn read.
                matches!(job.status, JobStatus::Processing | JobStatus::Done { .. })
            }));
        }

        registry.set_done(&job.id, "out.mp4".to_string()).await.unwrap();

        for handle in handles {
            assert!(handle.await.unwrap());
        }
    }
}
