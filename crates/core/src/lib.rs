pub mod config;
pub mod downloader;
pub mod locator;
pub mod pipeline;
pub mod pool;
pub mod registry;
pub mod runner;
pub mod testing;
pub mod transcoder;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, PoolConfig,
    ServerConfig, StorageConfig, ToolsConfig,
};
pub use downloader::{DownloadError, Downloader, YtDlpDownloader};
pub use locator::ArtifactLocator;
pub use pipeline::JobPipeline;
pub use pool::{PoolStatus, WorkerPool};
pub use registry::{
    DownloadRequest, Job, JobRegistry, JobStatus, MediaKind, QualityHint, RegistryError,
};
pub use runner::{ProcessRunner, RunOutput, RunnerError, TokioProcessRunner};
pub use transcoder::{FfmpegTranscoder, TranscodeError, Transcoder};
