//! In-process job registry and FIFO admission queue.

pub mod queue;
pub mod registry;

pub use queue::{job_channel, JobQueue, JobReceiver};
pub use registry::JobRegistry;
