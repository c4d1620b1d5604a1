//! FFprobe pixel-dimension probing.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// Pixel dimensions of a video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Portrait means strictly taller than wide, with both sides known.
    pub fn is_portrait(&self) -> bool {
        self.height > self.width && self.width > 0 && self.height > 0
    }
}

/// FFprobe JSON output, trimmed to the stream fields we read.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Probe a file's pixel dimensions.
///
/// Callers treat failure as non-fatal and default to a landscape
/// classification.
pub async fn probe_dimensions(path: impl AsRef<Path>) -> MediaResult<Dimensions> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-print_format",
            "json",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::probe_failed(
            "ffprobe exited with non-zero status",
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
        ));
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;

    let stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| MediaError::InvalidVideo("no video stream found".to_string()))?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => {
            Ok(Dimensions { width, height })
        }
        _ => Err(MediaError::InvalidVideo(
            "video stream reports no dimensions".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portrait_classification() {
        assert!(Dimensions {
            width: 1080,
            height: 1920
        }
        .is_portrait());
        assert!(!Dimensions {
            width: 1920,
            height: 1080
        }
        .is_portrait());
        // Square counts as landscape
        assert!(!Dimensions {
            width: 720,
            height: 720
        }
        .is_portrait());
        // Unknown dimensions never classify as portrait
        assert!(!Dimensions {
            width: 0,
            height: 480
        }
        .is_portrait());
    }

    #[test]
    fn test_ffprobe_json_shape_parses() {
        let raw = r#"{"streams":[{"codec_type":"audio"},{"codec_type":"video","width":1280,"height":720}]}"#;
        let out: FfprobeOutput = serde_json::from_str(raw).unwrap();
        let v = out
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .unwrap();
        assert_eq!(v.width, Some(1280));
        assert_eq!(v.height, Some(720));
    }
}
