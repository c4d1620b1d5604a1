//! The pipeline seam between the worker loop and the media layer.

use std::future::Future;
use std::path::{Path, PathBuf};

use clipd_media::{EncoderProfile, SourceResolver};

use crate::error::WorkerResult;

/// The two stages the worker drives for every job.
///
/// Trait-shaped so the loop's state handling can be exercised with a stub
/// that never touches yt-dlp or ffmpeg.
pub trait Pipeline: Send + Sync + 'static {
    /// Resolve a locator to a local source file (download on cache miss).
    fn fetch(&self, url: &str) -> impl Future<Output = WorkerResult<PathBuf>> + Send;

    /// Cut `[start, end)` from `input` into `output`.
    fn cut(
        &self,
        input: &Path,
        start: f64,
        end: f64,
        output: &Path,
    ) -> impl Future<Output = WorkerResult<()>> + Send;
}

/// Production pipeline over the resolver cache and the detected encoder.
#[derive(Debug, Clone)]
pub struct ClipPipeline {
    resolver: SourceResolver,
    encoder: EncoderProfile,
}

impl ClipPipeline {
    pub fn new(resolver: SourceResolver, encoder: EncoderProfile) -> Self {
        Self { resolver, encoder }
    }
}

impl Pipeline for ClipPipeline {
    async fn fetch(&self, url: &str) -> WorkerResult<PathBuf> {
        Ok(self.resolver.resolve_and_fetch(url).await?)
    }

    async fn cut(&self, input: &Path, start: f64, end: f64, output: &Path) -> WorkerResult<()> {
        Ok(clipd_media::cut(input, start, end, output, &self.encoder).await?)
    }
}
