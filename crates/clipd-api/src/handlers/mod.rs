//! Request handlers.

pub mod batch;
pub mod clips;
pub mod files;
pub mod probe;

use axum::Json;
use serde_json::{json, Value};

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}
