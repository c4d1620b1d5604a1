//! API routes.

use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers::batch::{batch_reset, batch_status};
use crate::handlers::clips::{clip_sync, get_job, list_jobs, queue_clip};
use crate::handlers::files::list_files;
use crate::handlers::health;
use crate::handlers::probe::probe_source;
use crate::middleware::cors_layer;
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/clip/queue", post(queue_clip))
        .route("/clip", post(clip_sync))
        .route("/jobs", get(list_jobs))
        .route("/jobs/:job_id", get(get_job))
        .route("/batch/status", get(batch_status))
        .route("/batch/reset", post(batch_reset))
        .route("/files", get(list_files))
        .route("/probe", post(probe_source))
        .layer(cors_layer(&state.config.cors_origins));

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/clips", ServeDir::new(state.config.clips_dir()))
        .route("/health", get(health))
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
