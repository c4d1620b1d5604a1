//! Shared data models for the clipd backend.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs and the forward-only job state machine
//! - Persisted batch state (sequence counter + last reset)
//! - Probed source metadata
//! - Deterministic clip filename derivation

pub mod batch;
pub mod filename;
pub mod job;
pub mod source;

// Re-export common types
pub use batch::BatchState;
pub use filename::{clip_filename, mmss, CLIP_EXT};
pub use job::{Job, JobId, JobState};
pub use source::{Chapter, SourceMeta};
