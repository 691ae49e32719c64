use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::transcoder::{TranscodeError, Transcoder};

/// A [`Transcoder`] that writes a placeholder output file (or fails with
/// a scripted diagnostic) and counts invocations.
pub struct MockTranscoder {
    fail_with: Option<String>,
    remux_count: Arc<AtomicUsize>,
}

impl MockTranscoder {
    pub fn succeeding() -> Self {
        Self {
            fail_with: None,
            remux_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(diagnostic: &str) -> Self {
        Self {
            fail_with: Some(diagnostic.to_string()),
            remux_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn remux_count(&self) -> usize {
        self.remux_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn remux(&self, _input: &Path, output: &Path) -> Result<(), TranscodeError> {
        self.remux_count.fetch_add(1, Ordering::SeqCst);

        if let Some(diagnostic) = &self.fail_with {
            return Err(TranscodeError::ToolFailed {
                diagnostic: diagnostic.clone(),
            });
        }

        tokio::fs::write(output, b"mock remuxed payload")
            .await
            .map_err(|e| TranscodeError::ToolFailed {
                diagnostic: e.to_string(),
            })?;
        Ok(())
    }
}
