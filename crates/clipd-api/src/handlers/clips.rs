//! Clip submission and job inspection handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use clipd_models::{clip_filename, Job, JobId};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Submission payload shared by the async and sync paths.
#[derive(Debug, Deserialize)]
pub struct ClipRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub end: Option<f64>,
}

/// Validate a submission; missing offsets default to zero and fall through
/// to the range check.
fn validate(req: &ClipRequest) -> ApiResult<(String, f64, f64)> {
    let url = req.url.as_deref().unwrap_or("").trim().to_string();
    let start = req.start.unwrap_or(0.0);
    let end = req.end.unwrap_or(0.0);

    if !start.is_finite() || !end.is_finite() {
        return Err(ApiError::validation("Invalid start/end"));
    }
    if url.is_empty() {
        return Err(ApiError::validation("Missing url"));
    }
    if end <= start {
        return Err(ApiError::validation("end must be greater than start"));
    }

    Ok((url, start, end))
}

#[derive(Debug, Serialize)]
pub struct QueueClipResponse {
    pub ok: bool,
    pub job_id: JobId,
    pub index: u64,
    pub filename: String,
}

/// Submit an asynchronous clip job.
pub async fn queue_clip(
    State(state): State<AppState>,
    Json(req): Json<ClipRequest>,
) -> ApiResult<Json<QueueClipResponse>> {
    let (url, start, end) = validate(&req)?;

    // Index is reserved at submission so output numbering follows
    // insertion order regardless of when the worker gets to the job.
    let index = state.batch.reserve_next().await?;
    let filename = clip_filename(index, start, end);

    let job = Job::new(url, start, end, index, filename.clone());
    let job_id = job.id.clone();

    state.registry.insert(job).await;
    state.queue.push(job_id.clone());

    info!(%job_id, index, %filename, "Queued clip job");
    Ok(Json(QueueClipResponse {
        ok: true,
        job_id,
        index,
        filename,
    }))
}

#[derive(Debug, Serialize)]
pub struct SyncClipResponse {
    pub ok: bool,
    pub file: String,
    pub url: String,
}

/// Legacy synchronous path: blocks through the full resolve+cut pipeline.
///
/// No registry record is created; the index is reserved only once the
/// download has succeeded.
pub async fn clip_sync(
    State(state): State<AppState>,
    Json(req): Json<ClipRequest>,
) -> ApiResult<Json<SyncClipResponse>> {
    let (url, start, end) = validate(&req)?;

    let source = state.resolver.resolve_and_fetch(&url).await?;

    let index = state.batch.reserve_next().await?;
    let filename = clip_filename(index, start, end);
    let output = state.config.clips_dir().join(&filename);

    clipd_media::cut(&source, start, end, &output, &state.encoder).await?;

    info!(index, %filename, "Synchronous clip finished");
    Ok(Json(SyncClipResponse {
        ok: true,
        url: format!("/clips/{filename}"),
        file: filename,
    }))
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub ok: bool,
    pub job: Job,
}

/// Poll a single job.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobResponse>> {
    let id = JobId::from_string(job_id);
    match state.registry.get(&id).await {
        Some(job) => Ok(Json(JobResponse { ok: true, job })),
        None => Err(ApiError::not_found("job not found")),
    }
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub ok: bool,
    pub items: Vec<Job>,
}

/// List all jobs, newest submission first.
pub async fn list_jobs(State(state): State<AppState>) -> Json<JobListResponse> {
    Json(JobListResponse {
        ok: true,
        items: state.registry.list().await,
    })
}
