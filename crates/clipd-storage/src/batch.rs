//! Batch sequence store.
//!
//! Persists the `{counter, last_reset}` singleton as a small JSON file.
//! Reservation and reset are full read-modify-write cycles under one lock,
//! so concurrent callers always receive distinct, gap-free indices.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::{debug, info};

use clipd_models::BatchState;

use crate::error::StorageResult;

/// Lock-guarded, file-backed batch state.
#[derive(Debug)]
pub struct BatchStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl BatchStore {
    /// Create a store persisting to `path`. The file is created lazily on
    /// the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Reserve the next sequence index.
    ///
    /// Returns the current counter and persists counter+1. An unreadable or
    /// corrupt state file is replaced by the default state rather than
    /// failing the caller; only the persist step can error.
    pub async fn reserve_next(&self) -> StorageResult<u64> {
        let _guard = self.lock.lock().await;
        let mut state = self.read_state().await;
        let index = state.counter;
        state.counter = index + 1;
        self.write_state(&state).await?;
        debug!(index, "Reserved batch index");
        Ok(index)
    }

    /// Reset the batch: counter back to 1, last_reset to now.
    pub async fn reset(&self) -> StorageResult<BatchState> {
        let _guard = self.lock.lock().await;
        let mut state = self.read_state().await;
        state.counter = 1;
        state.last_reset = now_epoch();
        self.write_state(&state).await?;
        info!(last_reset = state.last_reset, "Batch reset");
        Ok(state)
    }

    /// Read-only snapshot through the tolerant read path.
    pub async fn status(&self) -> BatchState {
        self.read_state().await
    }

    async fn read_state(&self) -> BatchState {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice::<BatchState>(&bytes) {
                Ok(state) => state.sanitized(),
                Err(e) => {
                    debug!("Unparseable batch state ({}), using defaults", e);
                    BatchState::default()
                }
            },
            Err(_) => BatchState::default(),
        }
    }

    async fn write_state(&self, state: &BatchState) -> StorageResult<()> {
        let json = serde_json::to_vec_pretty(state)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

/// Current time as fractional epoch seconds.
pub fn now_epoch() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> BatchStore {
        BatchStore::new(dir.path().join("batch_state.json"))
    }

    #[tokio::test]
    async fn test_reserve_is_sequential_and_gap_free() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.reserve_next().await.unwrap(), 1);
        assert_eq!(store.reserve_next().await.unwrap(), 2);
        assert_eq!(store.reserve_next().await.unwrap(), 3);
        assert_eq!(store.status().await.counter, 4);
    }

    #[tokio::test]
    async fn test_concurrent_reservations_are_exact() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(store_in(&dir));

        const N: u64 = 25;
        let mut handles = Vec::new();
        for _ in 0..N {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(
                async move { store.reserve_next().await.unwrap() },
            ));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            seen.insert(handle.await.unwrap());
        }

        let expected: HashSet<u64> = (1..=N).collect();
        assert_eq!(seen, expected);
        assert_eq!(store.status().await.counter, N + 1);
    }

    #[tokio::test]
    async fn test_corrupt_state_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("batch_state.json");
        tokio::fs::write(&path, b"{not json at all").await.unwrap();

        let store = BatchStore::new(&path);
        assert_eq!(store.status().await, BatchState::default());
        // Reservation recovers and re-persists valid state
        assert_eq!(store.reserve_next().await.unwrap(), 1);
        assert_eq!(store.status().await.counter, 2);
    }

    #[tokio::test]
    async fn test_out_of_range_state_is_clamped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("batch_state.json");
        tokio::fs::write(&path, br#"{"counter": 0, "last_reset": -9.0}"#)
            .await
            .unwrap();

        let store = BatchStore::new(&path);
        let state = store.status().await;
        assert_eq!(state.counter, 1);
        assert_eq!(state.last_reset, 0.0);
    }

    #[tokio::test]
    async fn test_reset_restarts_counter_and_advances_timestamp() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.reserve_next().await.unwrap();
        store.reserve_next().await.unwrap();
        let before = store.status().await;

        let state = store.reset().await.unwrap();
        assert_eq!(state.counter, 1);
        assert!(state.last_reset >= before.last_reset);
        assert!(state.last_reset > 0.0);

        // Persisted, not just returned
        assert_eq!(store.status().await.counter, 1);
        assert_eq!(store.reserve_next().await.unwrap(), 1);
    }
}
