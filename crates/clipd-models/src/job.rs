//! Job record and state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a clip job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a clip job.
///
/// States advance strictly forward: `Queued → Working → Downloading →
/// Clipping → Done`. `Error` is reachable from any non-terminal state.
/// `Done` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Waiting in the admission queue
    #[default]
    Queued,
    /// Picked up by the worker
    Working,
    /// Source video is being resolved/downloaded
    Downloading,
    /// Segment is being cut and re-encoded
    Clipping,
    /// Clip produced successfully
    Done,
    /// Processing failed; see the record's `error` field
    Error,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Working => "working",
            JobState::Downloading => "downloading",
            JobState::Clipping => "clipping",
            JobState::Done => "done",
            JobState::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Error)
    }

    /// Position in the forward-only ordering.
    fn rank(&self) -> u8 {
        match self {
            JobState::Queued => 0,
            JobState::Working => 1,
            JobState::Downloading => 2,
            JobState::Clipping => 3,
            JobState::Done => 4,
            JobState::Error => 4,
        }
    }

    /// Whether a transition from `self` to `next` advances the state.
    ///
    /// Terminal states accept no further transitions; everything else only
    /// moves to a strictly later position.
    pub fn can_advance_to(&self, next: JobState) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A clip-extraction job.
///
/// `index` and `filename` are assigned once at submission and never change.
/// `error` is meaningful only in state `Error`; `clip_url` only in `Done`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job ID
    pub id: JobId,

    /// Source video URL
    pub url: String,

    /// Clip start offset in seconds
    pub start: f64,

    /// Clip end offset in seconds (always > start)
    pub end: f64,

    /// Lifecycle state
    pub state: JobState,

    /// Reserved batch sequence index
    pub index: u64,

    /// Deterministic output filename
    pub filename: String,

    /// Submission timestamp
    pub queued_at: DateTime<Utc>,

    /// Failure message (state `Error` only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Access locator of the produced clip (state `Done` only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_url: Option<String>,
}

impl Job {
    /// Create a new queued job with its pre-reserved index and filename.
    pub fn new(url: impl Into<String>, start: f64, end: f64, index: u64, filename: String) -> Self {
        Self {
            id: JobId::new(),
            url: url.into(),
            start,
            end,
            state: JobState::Queued,
            index,
            filename,
            queued_at: Utc::now(),
            error: None,
            clip_url: None,
        }
    }
}
