use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipfetch_core::{
    load_config, validate_config, ArtifactLocator, Config, FfmpegTranscoder, JobPipeline,
    JobRegistry, ProcessRunner, TokioProcessRunner, WorkerPool, YtDlpDownloader,
};

use clipfetch_server::api::create_router;
use clipfetch_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path; defaults apply when no file is present.
    let config_path = std::env::var("CLIPFETCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    let config = if config_path.exists() {
        info!("Loading configuration from {:?}", config_path);
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?
    } else {
        info!("No config file at {:?}, using defaults", config_path);
        Config::default()
    };

    validate_config(&config).context("Configuration validation failed")?;
    info!("Storage directory: {:?}", config.storage.dir);
    info!("Worker pool capacity: {}", config.pool.capacity);

    // The downloader and transcoder both write here.
    tokio::fs::create_dir_all(&config.storage.dir)
        .await
        .with_context(|| format!("Failed to create storage dir {:?}", config.storage.dir))?;

    // Wire up the job engine.
    let runner: Arc<dyn ProcessRunner> = Arc::new(TokioProcessRunner);
    let process_timeout = Duration::from_secs(config.tools.process_timeout_secs);

    let downloader = YtDlpDownloader::new(
        config.tools.ytdlp_path.clone(),
        config.storage.dir.clone(),
        process_timeout,
        Arc::clone(&runner),
    );
    let transcoder = FfmpegTranscoder::new(
        config.tools.ffmpeg_path.clone(),
        process_timeout,
        Arc::clone(&runner),
    );

    let pipeline = Arc::new(JobPipeline::new(
        JobRegistry::new(),
        Arc::new(downloader),
        Arc::new(transcoder),
        ArtifactLocator::new(config.storage.dir.clone()),
        WorkerPool::new(config.pool.capacity),
    ));
    info!("Job pipeline ready");

    // Create app state and router
    let state = Arc::new(AppState::new(config.clone(), pipeline));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown. In-flight job pipelines are
    // abandoned on exit; job state is in-memory only and does not survive
    // a restart.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
