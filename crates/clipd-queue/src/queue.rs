//! FIFO admission queue.
//!
//! An unbounded channel of job ids: handlers push, the single worker
//! consumes in submission order, blocking while the queue is empty.

use tokio::sync::mpsc;
use tracing::warn;

use clipd_models::JobId;

/// Sending half, cloned into every submission handler.
#[derive(Debug, Clone)]
pub struct JobQueue {
    tx: mpsc::UnboundedSender<JobId>,
}

/// Receiving half, owned by the worker.
#[derive(Debug)]
pub struct JobReceiver {
    rx: mpsc::UnboundedReceiver<JobId>,
}

/// Create a connected queue/receiver pair.
pub fn job_channel() -> (JobQueue, JobReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (JobQueue { tx }, JobReceiver { rx })
}

impl JobQueue {
    /// Append a job id to the queue.
    ///
    /// Returns false if the worker has gone away; submissions still succeed
    /// from the caller's perspective and the job simply stays queued.
    pub fn push(&self, id: JobId) -> bool {
        match self.tx.send(id) {
            Ok(()) => true,
            Err(e) => {
                warn!("Job queue receiver dropped; {} not scheduled", e.0);
                false
            }
        }
    }
}

impl JobReceiver {
    /// Pull the next job id, waiting while the queue is empty.
    ///
    /// Returns `None` once every sender has been dropped.
    pub async fn recv(&mut self) -> Option<JobId> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fifo_order() {
        let (queue, mut rx) = job_channel();

        let ids: Vec<JobId> = (0..5).map(|_| JobId::new()).collect();
        for id in &ids {
            assert!(queue.push(id.clone()));
        }
        drop(queue);

        let mut received = Vec::new();
        while let Some(id) = rx.recv().await {
            received.push(id);
        }
        assert_eq!(received, ids);
    }

    #[tokio::test]
    async fn test_push_after_receiver_dropped() {
        let (queue, rx) = job_channel();
        drop(rx);
        assert!(!queue.push(JobId::new()));
    }
}
