//! Probed source metadata.

use serde::{Deserialize, Serialize};

/// A chapter marker reported by the source platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default)]
    pub end_time: f64,
}

/// Metadata resolved from a source locator without downloading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMeta {
    /// Canonical id assigned by the source platform (the cache key)
    pub id: String,
    pub title: String,
    pub uploader: String,
    /// Duration in seconds
    pub duration: f64,
    /// Highest-resolution thumbnail URL, empty if none
    pub thumbnail: String,
    /// True when the best video format is portrait (height > width)
    pub is_vertical: bool,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}
