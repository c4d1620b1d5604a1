//! Source resolution and the id-keyed download cache.
//!
//! A single yt-dlp metadata probe resolves a locator to its canonical id
//! and decides orientation; downloads land in the cache directory as
//! `<id>.mp4` and are reused on every later resolution of the same id until
//! the cache is purged by a batch reset.
//!
//! Cache population takes no lock: two concurrent first-time resolutions of
//! one id may both download, and the last rename wins.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

use clipd_models::{Chapter, SourceMeta};

use crate::error::{stderr_excerpt, MediaError, MediaResult};
use crate::fs_utils::move_file;
use crate::probe::probe_dimensions;

/// Landscape sources below this height get a quality warning after download.
const MIN_LANDSCAPE_HEIGHT: u32 = 720;

/// Browser-like user agent for the download requests.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// yt-dlp JSON output, trimmed to the fields we read.
#[derive(Debug, serde::Deserialize)]
struct RawInfo {
    id: Option<String>,
    title: Option<String>,
    uploader: Option<String>,
    channel: Option<String>,
    duration: Option<f64>,
    #[serde(default)]
    formats: Vec<RawFormat>,
    #[serde(default)]
    thumbnails: Vec<RawThumbnail>,
    #[serde(default)]
    chapters: Option<Vec<Chapter>>,
}

#[derive(Debug, serde::Deserialize)]
struct RawFormat {
    vcodec: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, serde::Deserialize)]
struct RawThumbnail {
    url: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

impl RawFormat {
    fn has_video(&self) -> bool {
        matches!(self.vcodec.as_deref(), Some(v) if v != "none")
    }

    fn area(&self) -> u64 {
        self.width.unwrap_or(0) as u64 * self.height.unwrap_or(0) as u64
    }
}

/// Classify orientation from the highest-area video format.
///
/// Empty lists or missing dimensions default to landscape; orientation
/// never fails a resolve.
fn orientation_from_formats(formats: &[RawFormat]) -> bool {
    let best = formats
        .iter()
        .filter(|f| f.has_video())
        .max_by_key(|f| f.area());

    match best {
        Some(f) => {
            let w = f.width.unwrap_or(0);
            let h = f.height.unwrap_or(0);
            h > w && w > 0 && h > 0
        }
        None => false,
    }
}

/// URL of the highest-area thumbnail, empty when none is reported.
fn best_thumbnail(thumbnails: &[RawThumbnail]) -> String {
    thumbnails
        .iter()
        .max_by_key(|t| t.width.unwrap_or(0) as u64 * t.height.unwrap_or(0) as u64)
        .and_then(|t| t.url.clone())
        .unwrap_or_default()
}

/// Prioritized yt-dlp format chain for a resolution cap.
///
/// DASH adaptive streams within the cap come first, then progressively
/// relaxed mp4 merges, muxed "best", and an HLS last resort.
fn format_chain(max_height: u32) -> String {
    format!(
        "bestvideo[protocol^=http_dash_segments][height<={h}][fps<=60]+bestaudio[ext=m4a]/\
         bestvideo[protocol^=http_dash_segments][height<={h}][fps<=60]+bestaudio/\
         bestvideo[ext=mp4][vcodec*=avc1][height<={h}][fps<=60]+bestaudio[ext=m4a]/\
         bestvideo[ext=mp4][height<={h}][fps<=60]+bestaudio/\
         best[height<={h}]/\
         (bv*+ba/b)[protocol^=m3u8]",
        h = max_height
    )
}

/// Resolves remote locators and maintains the on-disk source cache.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    tmp_dir: PathBuf,
}

impl SourceResolver {
    /// Create a resolver caching into `tmp_dir`.
    pub fn new(tmp_dir: impl Into<PathBuf>) -> Self {
        Self {
            tmp_dir: tmp_dir.into(),
        }
    }

    /// Cache path for a canonical id.
    pub fn cache_path(&self, id: &str) -> PathBuf {
        self.tmp_dir.join(format!("{id}.mp4"))
    }

    /// Query source metadata without downloading.
    pub async fn probe_source(&self, url: &str) -> MediaResult<SourceMeta> {
        which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

        let output = Command::new("yt-dlp")
            .args(["-J", "--no-playlist", url])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp metadata stderr: {}", stderr);
            return Err(MediaError::fetch_failed(format!(
                "yt-dlp metadata query failed: {}",
                stderr.lines().last().unwrap_or("unknown error")
            )));
        }

        let info: RawInfo = serde_json::from_slice(&output.stdout)?;

        let id = info
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| MediaError::fetch_failed("source reported no canonical id"))?;

        Ok(SourceMeta {
            id,
            title: info.title.unwrap_or_default(),
            uploader: info.uploader.or(info.channel).unwrap_or_default(),
            duration: info.duration.unwrap_or(0.0),
            thumbnail: best_thumbnail(&info.thumbnails),
            is_vertical: orientation_from_formats(&info.formats),
            chapters: info.chapters.unwrap_or_default(),
        })
    }

    /// Resolve a locator and return the cached local source file,
    /// downloading it on a cache miss.
    pub async fn resolve_and_fetch(&self, url: &str) -> MediaResult<PathBuf> {
        let meta = self.probe_source(url).await?;
        let cached = self.cache_path(&meta.id);

        if cached.exists() {
            info!(id = %meta.id, path = %cached.display(), "Source cache hit");
            return Ok(cached);
        }

        let max_height: u32 = if meta.is_vertical { 1920 } else { 1080 };
        self.download(url, &meta.id, max_height).await?;

        if !cached.exists() {
            self.normalize_download(&meta.id, &cached).await?;
        }

        // Sanity-check what we actually got; failures here only warn.
        match probe_dimensions(&cached).await {
            Ok(dims) => {
                info!(
                    id = %meta.id,
                    width = dims.width,
                    height = dims.height,
                    "Cached source file"
                );
                if !meta.is_vertical && dims.height < MIN_LANDSCAPE_HEIGHT {
                    warn!(
                        id = %meta.id,
                        height = dims.height,
                        "Landscape download below 720p; source likely limited"
                    );
                }
            }
            Err(e) => warn!(id = %meta.id, "Could not probe downloaded file: {}", e),
        }

        Ok(cached)
    }

    async fn download(&self, url: &str, id: &str, max_height: u32) -> MediaResult<()> {
        which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

        let out_template = self.tmp_dir.join(format!("{id}.%(ext)s"));
        let fmt = format_chain(max_height);

        info!(id = %id, max_height, "Downloading source");

        let args: Vec<String> = vec![
            "--no-playlist".into(),
            "--force-overwrites".into(),
            "--merge-output-format".into(),
            "mp4".into(),
            "--recode-video".into(),
            "mp4".into(),
            "--retries".into(),
            "10".into(),
            "--fragment-retries".into(),
            "10".into(),
            "--concurrent-fragments".into(),
            "5".into(),
            "--user-agent".into(),
            USER_AGENT.into(),
            "--add-header".into(),
            "Accept:*/*".into(),
            "--add-header".into(),
            "Accept-Language:en-US,en;q=0.9".into(),
            "--add-header".into(),
            "Origin:https://www.youtube.com".into(),
            "--add-header".into(),
            "Referer:https://www.youtube.com/".into(),
            "--format-sort".into(),
            "ext:mp4:m4a,vcodec:avc1,acodec:mp4a,codec:h264,res,fps".into(),
            "-f".into(),
            fmt,
            "-o".into(),
            out_template.to_string_lossy().into_owned(),
            url.into(),
        ];

        let output = Command::new("yt-dlp")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp download stderr: {}", stderr);
            return Err(MediaError::fetch_failed(format!(
                "yt-dlp download failed: {}",
                stderr_excerpt(stderr.lines().last().unwrap_or("unknown error"))
            )));
        }

        Ok(())
    }

    /// Move whatever extension yt-dlp produced onto the canonical
    /// `<id>.mp4` cache path.
    async fn normalize_download(&self, id: &str, cached: &Path) -> MediaResult<()> {
        let mut entries = tokio::fs::read_dir(&self.tmp_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_match = path.is_file()
                && path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(|stem| stem == id)
                    .unwrap_or(false);
            if is_match {
                move_file(&path, cached).await?;
                return Ok(());
            }
        }

        Err(MediaError::fetch_failed("download produced no output file"))
    }
}
