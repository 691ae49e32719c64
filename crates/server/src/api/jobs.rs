//! Job submission and status polling handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use clipfetch_core::{DownloadRequest, JobStatus, QualityHint};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Form body for `POST /download`
#[derive(Debug, Deserialize)]
pub struct DownloadBody {
    pub url: String,
    /// Numeric height hint ("720") or "best"; anything else means best.
    pub quality: Option<String>,
}

/// Form body for `POST /download-audio`
#[derive(Debug, Deserialize)]
pub struct DownloadAudioBody {
    pub url: String,
}

/// Response for a successful submission
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub job_id: String,
}

/// Response for `GET /status/{job_id}`
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusResponse {
    Processing,
    Failed { error: String },
    Done { download_url: String },
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Start a video download job. Returns the job id to poll on
/// `/status/{job_id}`.
pub async fn start_download(
    State(state): State<Arc<AppState>>,
    Form(body): Form<DownloadBody>,
) -> Result<Json<SubmitResponse>, (StatusCode, Json<ErrorResponse>)> {
    if body.url.trim().is_empty() {
        return Err(bad_request("url must not be empty"));
    }

    let request = DownloadRequest::video(body.url, QualityHint::parse(body.quality.as_deref()));
    let job_id = state.pipeline().submit(request).await;

    Ok(Json(SubmitResponse { job_id }))
}

/// Start an audio extraction job.
pub async fn start_download_audio(
    State(state): State<Arc<AppState>>,
    Form(body): Form<DownloadAudioBody>,
) -> Result<Json<SubmitResponse>, (StatusCode, Json<ErrorResponse>)> {
    if body.url.trim().is_empty() {
        return Err(bad_request("url must not be empty"));
    }

    let job_id = state
        .pipeline()
        .submit(DownloadRequest::audio(body.url))
        .await;

    Ok(Json(SubmitResponse { job_id }))
}

/// Poll a job's lifecycle state.
pub async fn job_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<StatusResponse>, (StatusCode, Json<ErrorResponse>)> {
    let job = state.registry().get(&job_id).await.ok_or((
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Job not found".to_string(),
        }),
    ))?;

    let response = match job.status {
        JobStatus::Processing => StatusResponse::Processing,
        JobStatus::Failed { error } => StatusResponse::Failed { error },
        JobStatus::Done { filename } => StatusResponse::Done {
            download_url: format!("/downloads/{}", filename),
        },
    };

    Ok(Json(response))
}
