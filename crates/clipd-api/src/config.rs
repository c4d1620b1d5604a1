//! API configuration.

use std::path::PathBuf;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins ("*" for any)
    pub cors_origins: Vec<String>,
    /// Root of all on-disk state (clips/, tmp/, batch_state.json)
    pub data_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            cors_origins: vec!["*".to_string()],
            data_dir: PathBuf::from("data"),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("CLIPD_HOST").unwrap_or(defaults.host),
            port: std::env::var("CLIPD_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            data_dir: std::env::var("CLIPD_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
        }
    }

    /// Directory holding finished clips.
    pub fn clips_dir(&self) -> PathBuf {
        self.data_dir.join("clips")
    }

    /// Transient source-cache directory.
    pub fn tmp_dir(&self) -> PathBuf {
        self.data_dir.join("tmp")
    }

    /// Persisted batch-state file.
    pub fn state_file(&self) -> PathBuf {
        self.data_dir.join("batch_state.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_paths() {
        let config = ApiConfig {
            data_dir: PathBuf::from("/srv/clipd"),
            ..Default::default()
        };
        assert_eq!(config.clips_dir(), PathBuf::from("/srv/clipd/clips"));
        assert_eq!(config.tmp_dir(), PathBuf::from("/srv/clipd/tmp"));
        assert_eq!(
            config.state_file(),
            PathBuf::from("/srv/clipd/batch_state.json")
        );
    }
}
