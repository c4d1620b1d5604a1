//! Hardware-encoder capability detection.
//!
//! Probed once at process start by enumerating FFmpeg's compiled-in
//! encoders, then walking a fixed fallback chain: NVENC, QuickSync, AMF,
//! VideoToolbox, VAAPI, and finally software x264. Each candidate carries
//! its own tuned input/output argument set.

use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, warn};

/// The selected encoder and its tuned arguments.
///
/// Computed once at startup and immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderProfile {
    /// FFmpeg encoder identifier (e.g. "h264_nvenc", "libx264")
    pub encoder: String,
    /// Extra input-side arguments (hardware-acceleration flags)
    pub input_args: Vec<String>,
    /// Extra output-side arguments (quality/rate-control flags)
    pub output_args: Vec<String>,
    /// Filter-graph stage required by the encoder, appended to the scale
    /// chain (VAAPI needs an nv12 upload before encoding)
    pub filter_suffix: Option<String>,
}

impl EncoderProfile {
    fn new(
        encoder: &str,
        input_args: &[&str],
        output_args: &[&str],
        filter_suffix: Option<&str>,
    ) -> Self {
        Self {
            encoder: encoder.to_string(),
            input_args: input_args.iter().map(|s| s.to_string()).collect(),
            output_args: output_args.iter().map(|s| s.to_string()).collect(),
            filter_suffix: filter_suffix.map(|s| s.to_string()),
        }
    }

    /// Tuned software fallback, selected when no hardware encoder is listed.
    pub fn software() -> Self {
        Self::new("libx264", &[], &["-preset", "slower", "-crf", "16"], None)
    }

    /// Conservative software profile, used when encoder enumeration itself
    /// fails and nothing is known about the host.
    pub fn conservative() -> Self {
        Self::new("libx264", &[], &["-preset", "medium", "-crf", "20"], None)
    }

    pub fn is_hardware(&self) -> bool {
        self.encoder != "libx264"
    }
}

/// Pick the best available encoder from an `ffmpeg -encoders` listing.
pub fn select_encoder(listing: &str) -> EncoderProfile {
    if listing.contains("h264_nvenc") {
        return EncoderProfile::new(
            "h264_nvenc",
            &["-hwaccel", "cuda"],
            &[
                "-preset", "p7", "-rc", "vbr", "-cq", "16", "-qmin", "16", "-qmax", "18", "-b:v",
                "8M",
            ],
            None,
        );
    }
    if listing.contains("h264_qsv") {
        return EncoderProfile::new(
            "h264_qsv",
            &["-hwaccel", "qsv"],
            &["-global_quality", "18", "-b:v", "8M"],
            None,
        );
    }
    if listing.contains("h264_amf") {
        return EncoderProfile::new(
            "h264_amf",
            &["-hwaccel", "d3d11va"],
            &["-quality", "quality", "-rc", "vbr_peak", "-b:v", "8M"],
            None,
        );
    }
    if listing.contains("h264_videotoolbox") {
        return EncoderProfile::new(
            "h264_videotoolbox",
            &[],
            &["-b:v", "8M", "-q:v", "60"],
            None,
        );
    }
    if listing.contains("h264_vaapi") {
        return EncoderProfile::new(
            "h264_vaapi",
            &["-hwaccel", "vaapi", "-vaapi_device", "/dev/dri/renderD128"],
            &["-rc_mode", "2", "-b:v", "8M"],
            Some("format=nv12,hwupload"),
        );
    }

    EncoderProfile::software()
}

/// Enumerate available encoders and select one.
///
/// Never fails: an unreachable or broken FFmpeg yields the conservative
/// software profile.
pub async fn detect_encoder() -> EncoderProfile {
    let listing = match Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
    {
        Ok(output) => {
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            text
        }
        Err(e) => {
            warn!("Encoder enumeration failed ({}), using software defaults", e);
            return EncoderProfile::conservative();
        }
    };

    let profile = select_encoder(&listing);
    info!(encoder = %profile.encoder, hardware = profile.is_hardware(), "Selected video encoder");
    profile
}
