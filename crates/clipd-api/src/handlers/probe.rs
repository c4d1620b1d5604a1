//! Source metadata probing.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use clipd_models::SourceMeta;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProbeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub meta: SourceMeta,
}

/// Resolve source metadata without downloading.
pub async fn probe_source(
    State(state): State<AppState>,
    Json(req): Json<ProbeRequest>,
) -> ApiResult<Json<ProbeResponse>> {
    let url = req.url.as_deref().unwrap_or("").trim().to_string();
    if url.is_empty() {
        return Err(ApiError::validation("Missing url"));
    }

    let meta = state.resolver.probe_source(&url).await?;
    Ok(Json(ProbeResponse { ok: true, meta }))
}
