use std::sync::Arc;

use clipfetch_core::{Config, JobPipeline, JobRegistry};

/// Shared application state
pub struct AppState {
    config: Config,
    pipeline: Arc<JobPipeline>,
}

impl AppState {
    pub fn new(config: Config, pipeline: Arc<JobPipeline>) -> Self {
        Self { config, pipeline }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pipeline(&self) -> &JobPipeline {
        &self.pipeline
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        self.pipeline.registry()
    }
}
