//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Maximum number of stderr characters carried in a diagnostic excerpt.
const STDERR_EXCERPT_LIMIT: usize = 4000;

/// Errors that can occur while resolving, probing, or transcoding media.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("yt-dlp not found in PATH")]
    YtDlpNotFound,

    #[error("Fetch failed: {message}")]
    FetchFailed { message: String },

    #[error("Probe failed: {message}")]
    ProbeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("End time must be greater than start time (start={start}, end={end})")]
    InvalidRange { start: f64, end: f64 },

    #[error("Transcode failed: {message}")]
    TranscodeFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create a fetch failure error.
    pub fn fetch_failed(message: impl Into<String>) -> Self {
        Self::FetchFailed {
            message: message.into(),
        }
    }

    /// Create a probe failure error.
    pub fn probe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ProbeFailed {
            message: message.into(),
            stderr,
        }
    }

    /// Create a transcode failure error with a bounded stderr excerpt.
    pub fn transcode_failed(
        message: impl Into<String>,
        stderr: Option<&str>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::TranscodeFailed {
            message: message.into(),
            stderr: stderr.map(stderr_excerpt),
            exit_code,
        }
    }
}

/// Bound a tool's stderr to the first few thousand characters.
pub fn stderr_excerpt(stderr: &str) -> String {
    stderr.chars().take(STDERR_EXCERPT_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_excerpt_bounds_length() {
        let long = "x".repeat(10_000);
        assert_eq!(stderr_excerpt(&long).len(), STDERR_EXCERPT_LIMIT);

        let short = "broken pipe";
        assert_eq!(stderr_excerpt(short), short);
    }

    #[test]
    fn test_transcode_failed_carries_excerpt() {
        let noise = "e".repeat(9000);
        let err = MediaError::transcode_failed("ffmpeg exited", Some(&noise), Some(1));
        match err {
            MediaError::TranscodeFailed {
                stderr: Some(s),
                exit_code: Some(1),
                ..
            } => assert_eq!(s.len(), STDERR_EXCERPT_LIMIT),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
