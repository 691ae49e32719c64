use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::{handlers, jobs};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let storage_dir = state.config().storage.dir.clone();

    Router::new()
        .route("/health", get(handlers::health))
        .route("/download", post(jobs::start_download))
        .route("/download-audio", post(jobs::start_download_audio))
        .route("/status/{job_id}", get(jobs::job_status))
        // Completed artifacts; ServeDir derives the content-type from the
        // extension and answers 404 for anything not on disk.
        .nest_service("/downloads", ServeDir::new(storage_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
