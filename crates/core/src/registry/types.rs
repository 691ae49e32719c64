use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of media a job fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
}

/// Optional quality constraint for video jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityHint {
    /// No constraint, take the best available streams.
    Best,
    /// Cap the video stream height in pixels.
    MaxHeight(u32),
}

impl QualityHint {
    /// Parse a client-supplied quality string. Numeric strings become a
    /// height cap; anything else (including "best" and absent) means no
    /// constraint.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => s
                .parse::<u32>()
                .map(QualityHint::MaxHeight)
                .unwrap_or(QualityHint::Best),
            _ => QualityHint::Best,
        }
    }
}

/// The parameters a job was submitted with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// Source media URL.
    pub url: String,
    /// Video or audio.
    pub kind: MediaKind,
    /// Quality constraint (video only, ignored for audio).
    pub quality: QualityHint,
}

impl DownloadRequest {
    pub fn video(url: impl Into<String>, quality: QualityHint) -> Self {
        Self {
            url: url.into(),
            kind: MediaKind::Video,
            quality,
        }
    }

    pub fn audio(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: MediaKind::Audio,
            quality: QualityHint::Best,
        }
    }
}

/// Job lifecycle state.
///
/// `Processing` is the only non-terminal state; a job transitions out of it
/// exactly once. The terminal payloads carry the one piece of data each
/// outcome produces, so "filename iff done, error iff failed" holds by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Processing,
    Done { filename: String },
    Failed { error: String },
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Processing)
    }
}

/// One tracked download job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub request: DownloadRequest,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}
