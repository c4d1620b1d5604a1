//! The worker loop.
//!
//! One consumer pulls job ids off the queue in submission order and walks
//! each job `working → downloading → clipping → done`, or straight to
//! `error` with the failing stage's message. A job's failure never ends the
//! loop; the registry lock is only held for individual updates.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use clipd_models::{JobId, JobState};
use clipd_queue::{JobReceiver, JobRegistry};

use crate::pipeline::Pipeline;

/// Single-flight clip worker.
pub struct Worker<P> {
    registry: Arc<JobRegistry>,
    pipeline: P,
    clips_dir: PathBuf,
}

impl<P: Pipeline> Worker<P> {
    pub fn new(registry: Arc<JobRegistry>, pipeline: P, clips_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            pipeline,
            clips_dir: clips_dir.into(),
        }
    }

    /// Consume the queue until every sender is gone.
    ///
    /// Runs for the process lifetime in normal operation.
    pub async fn run(self, mut rx: JobReceiver) {
        info!("Clip worker started");
        while let Some(id) = rx.recv().await {
            self.run_job(&id).await;
        }
        info!("Job queue closed, clip worker exiting");
    }

    async fn run_job(&self, id: &JobId) {
        let Some(job) = self.registry.get(id).await else {
            warn!(job_id = %id, "Dequeued unknown job");
            return;
        };

        info!(job_id = %id, index = job.index, url = %job.url, "Processing job");
        self.registry.advance(id, JobState::Working).await;

        self.registry.advance(id, JobState::Downloading).await;
        let source = match self.pipeline.fetch(&job.url).await {
            Ok(path) => path,
            Err(e) => {
                error!(job_id = %id, "Source fetch failed: {}", e);
                self.registry.fail(id, e.to_string()).await;
                return;
            }
        };

        self.registry.advance(id, JobState::Clipping).await;
        let output = self.clips_dir.join(&job.filename);
        match self
            .pipeline
            .cut(&source, job.start, job.end, &output)
            .await
        {
            Ok(()) => {
                info!(job_id = %id, file = %job.filename, "Job done");
                self.registry
                    .complete(id, format!("/clips/{}", job.filename))
                    .await;
            }
            Err(e) => {
                error!(job_id = %id, "Transcode failed: {}", e);
                self.registry.fail(id, e.to_string()).await;
            }
        }
    }
}
