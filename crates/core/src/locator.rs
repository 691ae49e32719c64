//! Artifact discovery: find the output file a job produced.
//!
//! The downloader names its outputs `{job_id}.{ext}` but the extension is
//! chosen by the tool, and intermediate fragments (e.g. a bare audio
//! stream downloaded before merging) can sit next to the final file. The
//! locator picks the playable artifact by a fixed extension priority.

use std::path::{Path, PathBuf};

/// Extension priority for artifact selection, best first. A single list
/// is used for both audio and video jobs, matching the selection
/// behavior the rest of the pipeline is built around.
pub const PREFERRED_EXTENSIONS: [&str; 4] = ["mp4", "mp3", "mkv", "webm"];

/// Pure selection over a set of file names: keep names prefixed by
/// `{job_id}.`, prefer [`PREFERRED_EXTENSIONS`] in order, otherwise fall
/// back to the first match as enumerated.
pub fn select_artifact(job_id: &str, names: &[String]) -> Option<String> {
    let prefix = format!("{}.", job_id);
    let matches: Vec<&String> = names.iter().filter(|n| n.starts_with(&prefix)).collect();

    for ext in PREFERRED_EXTENSIONS {
        let suffix = format!(".{}", ext);
        if let Some(name) = matches
            .iter()
            .find(|n| n.to_lowercase().ends_with(&suffix))
        {
            return Some((*name).clone());
        }
    }

    matches.first().map(|n| (*n).clone())
}

/// Scans a storage directory for job artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    storage_dir: PathBuf,
}

impl ArtifactLocator {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
        }
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Locate the artifact for a job, returning its file name (not path).
    pub async fn locate(&self, job_id: &str) -> Result<Option<String>, std::io::Error> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.storage_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        Ok(select_artifact(job_id, &names))
    }
}
