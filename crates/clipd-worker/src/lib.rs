//! Single background consumer driving the clip pipeline.
//!
//! This crate provides:
//! - The `Pipeline` seam (fetch + cut) over the media layer
//! - The worker loop advancing each job to a terminal state

pub mod error;
pub mod pipeline;
pub mod worker;

pub use error::{WorkerError, WorkerResult};
pub use pipeline::{ClipPipeline, Pipeline};
pub use worker::Worker;
