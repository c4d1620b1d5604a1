//! Job registry.
//!
//! One mutex guards the id→record map; every read and write goes through
//! it. Submitting handlers insert records, the worker mutates them, and
//! poll/list handlers read consistent snapshots. State updates are
//! forward-only: a transition that does not advance the record's state is
//! ignored.

use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::warn;

use clipd_models::{Job, JobId, JobState};

/// Mutex-guarded map of job records.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<JobId, Job>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly submitted job.
    pub async fn insert(&self, job: Job) {
        self.jobs.lock().await.insert(job.id.clone(), job);
    }

    /// Snapshot a single job.
    pub async fn get(&self, id: &JobId) -> Option<Job> {
        self.jobs.lock().await.get(id).cloned()
    }

    /// Snapshot all jobs, newest submission first.
    pub async fn list(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.jobs.lock().await.values().cloned().collect();
        jobs.sort_by(|a, b| {
            b.queued_at
                .cmp(&a.queued_at)
                .then_with(|| b.index.cmp(&a.index))
        });
        jobs
    }

    /// Number of known jobs.
    pub async fn len(&self) -> usize {
        self.jobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.lock().await.is_empty()
    }

    /// Advance a job to `next` if that is a forward transition.
    ///
    /// Returns whether the state changed. Unknown ids and non-advancing
    /// transitions are ignored.
    pub async fn advance(&self, id: &JobId, next: JobState) -> bool {
        let mut jobs = self.jobs.lock().await;
        match jobs.get_mut(id) {
            Some(job) if job.state.can_advance_to(next) => {
                job.state = next;
                true
            }
            Some(job) => {
                warn!(job_id = %id, current = %job.state, requested = %next, "Ignoring non-advancing transition");
                false
            }
            None => {
                warn!(job_id = %id, "Unknown job in transition");
                false
            }
        }
    }

    /// Terminate a job successfully, recording the result locator.
    pub async fn complete(&self, id: &JobId, clip_url: String) {
        let mut jobs = self.jobs.lock().await;
        if let Some(job) = jobs.get_mut(id) {
            if job.state.can_advance_to(JobState::Done) {
                job.state = JobState::Done;
                job.clip_url = Some(clip_url);
            }
        }
    }

    /// Terminate a job with a failure message.
    pub async fn fail(&self, id: &JobId, error: String) {
        let mut jobs = self.jobs.lock().await;
        if let Some(job) = jobs.get_mut(id) {
            if job.state.can_advance_to(JobState::Error) {
                job.state = JobState::Error;
                job.error = Some(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipd_models::clip_filename;

    fn job(index: u64) -> Job {
        Job::new(
            "https://youtu.be/abc",
            0.0,
            10.0,
            index,
            clip_filename(index, 0.0, 10.0),
        )
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let registry = JobRegistry::new();
        let j = job(1);
        let id = j.id.clone();
        registry.insert(j).await;

        let got = registry.get(&id).await.unwrap();
        assert_eq!(got.state, JobState::Queued);
        assert!(registry.get(&JobId::from_string("missing")).await.is_none());
    }

    #[tokio::test]
    async fn test_advance_is_forward_only() {
        let registry = JobRegistry::new();
        let j = job(1);
        let id = j.id.clone();
        registry.insert(j).await;

        assert!(registry.advance(&id, JobState::Working).await);
        assert!(registry.advance(&id, JobState::Downloading).await);

        // Regression attempts leave the record untouched
        assert!(!registry.advance(&id, JobState::Working).await);
        assert!(!registry.advance(&id, JobState::Queued).await);
        assert_eq!(registry.get(&id).await.unwrap().state, JobState::Downloading);
    }

    #[tokio::test]
    async fn test_terminal_states_absorb() {
        let registry = JobRegistry::new();
        let j = job(1);
        let id = j.id.clone();
        registry.insert(j).await;

        registry.fail(&id, "network down".into()).await;
        let got = registry.get(&id).await.unwrap();
        assert_eq!(got.state, JobState::Error);
        assert_eq!(got.error.as_deref(), Some("network down"));

        // A terminal job cannot be completed afterwards
        registry.complete(&id, "/clips/x.mp4".into()).await;
        let got = registry.get(&id).await.unwrap();
        assert_eq!(got.state, JobState::Error);
        assert!(got.clip_url.is_none());
    }

    #[tokio::test]
    async fn test_complete_records_url() {
        let registry = JobRegistry::new();
        let j = job(2);
        let id = j.id.clone();
        let filename = j.filename.clone();
        registry.insert(j).await;

        registry.advance(&id, JobState::Working).await;
        registry.complete(&id, format!("/clips/{filename}")).await;

        let got = registry.get(&id).await.unwrap();
        assert_eq!(got.state, JobState::Done);
        assert_eq!(got.clip_url.as_deref(), Some("/clips/(2) 0000-0010.mp4"));
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let registry = JobRegistry::new();
        for i in 1..=3 {
            registry.insert(job(i)).await;
        }

        let listed = registry.list().await;
        assert_eq!(listed.len(), 3);
        let indices: Vec<u64> = listed.iter().map(|j| j.index).collect();
        assert_eq!(indices, vec![3, 2, 1]);
    }
}
