//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors surfaced by a pipeline stage.
///
/// These never propagate past a single job: the worker stores the message
/// on the record and moves on.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("{0}")]
    Media(#[from] clipd_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Stage(String),
}

impl WorkerError {
    pub fn stage(msg: impl Into<String>) -> Self {
        Self::Stage(msg.into())
    }
}
