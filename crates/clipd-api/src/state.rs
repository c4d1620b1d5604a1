//! Application state.

use std::sync::Arc;

use clipd_media::{EncoderProfile, SourceResolver};
use clipd_queue::{job_channel, JobQueue, JobReceiver, JobRegistry};
use clipd_storage::{BatchStore, FileCatalog};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub registry: Arc<JobRegistry>,
    pub queue: JobQueue,
    pub batch: Arc<BatchStore>,
    pub catalog: Arc<FileCatalog>,
    pub resolver: SourceResolver,
    pub encoder: Arc<EncoderProfile>,
}

impl AppState {
    /// Create application state, its on-disk layout, and the worker's queue
    /// receiver.
    pub async fn new(
        config: ApiConfig,
        encoder: EncoderProfile,
    ) -> std::io::Result<(Self, JobReceiver)> {
        tokio::fs::create_dir_all(config.clips_dir()).await?;
        tokio::fs::create_dir_all(config.tmp_dir()).await?;

        let (queue, rx) = job_channel();

        let state = Self {
            registry: Arc::new(JobRegistry::new()),
            queue,
            batch: Arc::new(BatchStore::new(config.state_file())),
            catalog: Arc::new(FileCatalog::new(config.clips_dir(), config.tmp_dir())),
            resolver: SourceResolver::new(config.tmp_dir()),
            encoder: Arc::new(encoder),
            config,
        };

        Ok((state, rx))
    }
}
