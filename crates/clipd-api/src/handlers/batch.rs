//! Batch housekeeping handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BatchStatusResponse {
    pub ok: bool,
    pub counter: u64,
    pub last_reset: f64,
}

/// Current counter and last reset time.
pub async fn batch_status(State(state): State<AppState>) -> Json<BatchStatusResponse> {
    let st = state.batch.status().await;
    Json(BatchStatusResponse {
        ok: true,
        counter: st.counter,
        last_reset: st.last_reset,
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub folder: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub ok: bool,
    pub counter: u64,
    pub tmp_deleted: usize,
    pub archived: Vec<String>,
    pub folder: String,
}

/// Reset the batch: optionally archive current clips, restart the counter,
/// and purge the source cache.
pub async fn batch_reset(
    State(state): State<AppState>,
    body: Option<Json<ResetRequest>>,
) -> ApiResult<Json<ResetResponse>> {
    let folder = body
        .map(|Json(req)| req.folder.unwrap_or_default())
        .unwrap_or_default()
        .trim()
        .to_string();

    // Archive against the pre-reset timestamp so exactly the current batch
    // moves.
    let snapshot = state.batch.status().await;
    let archived = if folder.is_empty() {
        Vec::new()
    } else {
        state
            .catalog
            .archive_current(&folder, snapshot.last_reset)
            .await
    };

    let new_state = state.batch.reset().await?;
    let tmp_deleted = state.catalog.purge_tmp().await;

    info!(
        counter = new_state.counter,
        tmp_deleted,
        archived = archived.len(),
        "Batch reset complete"
    );

    Ok(Json(ResetResponse {
        ok: true,
        counter: new_state.counter,
        tmp_deleted,
        archived,
        folder,
    }))
}
