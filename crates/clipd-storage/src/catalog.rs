//! Output-file catalog.
//!
//! The current batch is the set of clip files modified at or after the
//! store's `last_reset`. Archiving and tmp purging are best-effort per
//! entry; an unreadable or vanished file is skipped, never fatal.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::StorageResult;

/// A clip file visible in the current batch.
#[derive(Debug, Clone, Serialize)]
pub struct ClipFile {
    /// File name within the clip directory
    pub file: String,
    /// Access locator served by the HTTP layer
    pub url: String,
    /// Size in bytes
    pub bytes: u64,
    /// Modification time, epoch seconds
    #[serde(skip)]
    pub modified: f64,
}

/// Catalog over the clip output directory and the transient source cache.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    clips_dir: PathBuf,
    tmp_dir: PathBuf,
}

impl FileCatalog {
    pub fn new(clips_dir: impl Into<PathBuf>, tmp_dir: impl Into<PathBuf>) -> Self {
        Self {
            clips_dir: clips_dir.into(),
            tmp_dir: tmp_dir.into(),
        }
    }

    pub fn clips_dir(&self) -> &Path {
        &self.clips_dir
    }

    /// List current-batch files (mtime ≥ `last_reset`), newest first.
    pub async fn list_current_batch(&self, last_reset: f64) -> StorageResult<Vec<ClipFile>> {
        let mut files = Vec::new();

        let mut entries = tokio::fs::read_dir(&self.clips_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            let modified = mtime_epoch(&meta);
            if modified < last_reset {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            files.push(ClipFile {
                url: format!("/clips/{name}"),
                file: name,
                bytes: meta.len(),
                modified,
            });
        }

        sort_newest_first(&mut files);
        Ok(files)
    }

    /// Move every current-batch file into `folder` beneath the clip
    /// directory. Individual move failures are skipped. Returns the names
    /// that were archived.
    pub async fn archive_current(&self, folder: &str, last_reset: f64) -> Vec<String> {
        let archive_dir = self.clips_dir.join(folder);
        if let Err(e) = tokio::fs::create_dir_all(&archive_dir).await {
            warn!("Could not create archive folder {}: {}", archive_dir.display(), e);
            return Vec::new();
        }

        let mut archived = Vec::new();
        let Ok(mut entries) = tokio::fs::read_dir(&self.clips_dir).await else {
            return archived;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            if mtime_epoch(&meta) < last_reset {
                continue;
            }
            let name = entry.file_name();
            match tokio::fs::rename(&path, archive_dir.join(&name)).await {
                Ok(()) => archived.push(name.to_string_lossy().into_owned()),
                Err(e) => debug!("Skipping archive of {}: {}", path.display(), e),
            }
        }

        archived
    }

    /// Remove every entry in the source-cache directory. Returns the number
    /// of entries removed.
    pub async fn purge_tmp(&self) -> usize {
        let mut removed = 0;
        let Ok(mut entries) = tokio::fs::read_dir(&self.tmp_dir).await else {
            return removed;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            let result = if path.is_dir() {
                tokio::fs::remove_dir_all(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };
            match result {
                Ok(()) => removed += 1,
                Err(e) => debug!("Skipping purge of {}: {}", path.display(), e),
            }
        }
        removed
    }
}

/// Order files newest first; equal timestamps fall back to name order so
/// the listing is stable.
fn sort_newest_first(files: &mut [ClipFile]) {
    files.sort_by(|a, b| {
        b.modified
            .partial_cmp(&a.modified)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.file.cmp(&b.file))
    });
}

fn mtime_epoch(meta: &std::fs::Metadata) -> f64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn catalog_in(dir: &TempDir) -> FileCatalog {
        FileCatalog::new(dir.path().join("clips"), dir.path().join("tmp"))
    }

    async fn setup(dir: &TempDir) -> FileCatalog {
        let catalog = catalog_in(dir);
        tokio::fs::create_dir_all(&catalog.clips_dir).await.unwrap();
        tokio::fs::create_dir_all(&catalog.tmp_dir).await.unwrap();
        catalog
    }

    #[tokio::test]
    async fn test_list_filters_by_last_reset() {
        let dir = TempDir::new().unwrap();
        let catalog = setup(&dir).await;

        let path = catalog.clips_dir.join("(1) 0000-0010.mp4");
        tokio::fs::write(&path, b"clip").await.unwrap();
        let mtime = mtime_epoch(&std::fs::metadata(&path).unwrap());

        // Reset far in the past: file is in the current batch
        let items = catalog.list_current_batch(mtime - 10.0).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].file, "(1) 0000-0010.mp4");
        assert_eq!(items[0].url, "/clips/(1) 0000-0010.mp4");
        assert_eq!(items[0].bytes, 4);

        // Reset after the file's mtime: excluded even though not archived
        let items = catalog.list_current_batch(mtime + 10.0).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_list_ignores_directories() {
        let dir = TempDir::new().unwrap();
        let catalog = setup(&dir).await;

        tokio::fs::create_dir(catalog.clips_dir.join("archive-1"))
            .await
            .unwrap();
        tokio::fs::write(catalog.clips_dir.join("(1) 0000-0010.mp4"), b"x")
            .await
            .unwrap();

        let items = catalog.list_current_batch(0.0).await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_sort_newest_first() {
        let mk = |file: &str, modified: f64| ClipFile {
            file: file.to_string(),
            url: format!("/clips/{file}"),
            bytes: 0,
            modified,
        };
        let mut files = vec![mk("a", 10.0), mk("c", 30.0), mk("b", 20.0), mk("d", 30.0)];
        sort_newest_first(&mut files);
        let order: Vec<&str> = files.iter().map(|f| f.file.as_str()).collect();
        assert_eq!(order, vec!["c", "d", "b", "a"]);
    }

    #[tokio::test]
    async fn test_archive_moves_current_batch() {
        let dir = TempDir::new().unwrap();
        let catalog = setup(&dir).await;

        tokio::fs::write(catalog.clips_dir.join("(1) 0000-0010.mp4"), b"x")
            .await
            .unwrap();
        tokio::fs::write(catalog.clips_dir.join("(2) 0010-0020.mp4"), b"y")
            .await
            .unwrap();

        let mut archived = catalog.archive_current("session-1", 0.0).await;
        archived.sort();
        assert_eq!(archived, vec!["(1) 0000-0010.mp4", "(2) 0010-0020.mp4"]);

        assert!(catalog
            .clips_dir
            .join("session-1")
            .join("(1) 0000-0010.mp4")
            .exists());
        assert!(!catalog.clips_dir.join("(1) 0000-0010.mp4").exists());

        // Archived files left the listing
        let items = catalog.list_current_batch(0.0).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_purge_tmp_clears_files_and_dirs() {
        let dir = TempDir::new().unwrap();
        let catalog = setup(&dir).await;

        tokio::fs::write(catalog.tmp_dir.join("abc123.mp4"), b"v")
            .await
            .unwrap();
        tokio::fs::create_dir(catalog.tmp_dir.join("fragments"))
            .await
            .unwrap();
        tokio::fs::write(catalog.tmp_dir.join("fragments").join("f0"), b"v")
            .await
            .unwrap();

        let removed = catalog.purge_tmp().await;
        assert_eq!(removed, 2);

        let mut entries = tokio::fs::read_dir(&catalog.tmp_dir).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_missing_tmp_is_zero() {
        let dir = TempDir::new().unwrap();
        let catalog = catalog_in(&dir);
        assert_eq!(catalog.purge_tmp().await, 0);
    }
}
