//! Common test utilities: an in-process server with mock tool adapters.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use clipfetch_core::testing::{MockDownloadOutcome, MockDownloader, MockTranscoder};
use clipfetch_core::{
    ArtifactLocator, Config, Downloader, JobPipeline, JobRegistry, StorageConfig, Transcoder,
    WorkerPool,
};
use clipfetch_server::api::create_router;
use clipfetch_server::state::AppState;

/// In-process server over a temp storage dir with scripted tool mocks.
pub struct TestFixture {
    pub router: Router,
    pub registry: Arc<JobRegistry>,
    pub storage: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub content_type: Option<String>,
}

impl TestFixture {
    /// Fixture whose downloader writes one artifact with the given
    /// extension and succeeds.
    pub fn downloading(extension: &str) -> Self {
        let storage = TempDir::new().expect("Failed to create temp dir");
        let downloader = MockDownloader::writing(storage.path(), extension);
        Self::with_mocks(storage, Arc::new(downloader), Arc::new(MockTranscoder::succeeding()))
    }

    /// Fixture whose downloader fails with the given diagnostic.
    pub fn failing_download(diagnostic: &str) -> Self {
        let storage = TempDir::new().expect("Failed to create temp dir");
        let downloader = MockDownloader::new(
            storage.path(),
            MockDownloadOutcome::Fail {
                diagnostic: diagnostic.to_string(),
            },
        );
        Self::with_mocks(storage, Arc::new(downloader), Arc::new(MockTranscoder::succeeding()))
    }

    pub fn with_mocks(
        storage: TempDir,
        downloader: Arc<dyn Downloader>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        let config = Config {
            storage: StorageConfig {
                dir: storage.path().to_path_buf(),
            },
            ..Default::default()
        };

        let registry = JobRegistry::new();
        let pipeline = Arc::new(JobPipeline::new(
            Arc::clone(&registry),
            downloader,
            transcoder,
            ArtifactLocator::new(storage.path()),
            WorkerPool::new(config.pool.capacity),
        ));

        let state = Arc::new(AppState::new(config, pipeline));
        let router = create_router(state);

        Self {
            router,
            registry,
            storage,
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        self.storage.path().to_path_buf()
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a POST request with a urlencoded form body.
    pub async fn post_form(&self, path: &str, form: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            body,
            content_type,
        }
    }

    /// Poll `/status/{job_id}` until it reports a terminal status.
    pub async fn wait_terminal(&self, job_id: &str) -> TestResponse {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let response = self.get(&format!("/status/{}", job_id)).await;
            if response.body["status"] != "processing" {
                return response;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "job {} stuck in processing",
                job_id
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}
