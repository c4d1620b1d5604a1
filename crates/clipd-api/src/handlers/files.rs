//! Current-batch file listing.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use clipd_storage::ClipFile;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FilesResponse {
    pub ok: bool,
    pub items: Vec<ClipFile>,
}

/// List clips produced since the last reset, newest first.
pub async fn list_files(State(state): State<AppState>) -> ApiResult<Json<FilesResponse>> {
    let st = state.batch.status().await;
    let items = state.catalog.list_current_batch(st.last_reset).await?;
    Ok(Json(FilesResponse { ok: true, items }))
}
