//! Clip transcoding.
//!
//! Cuts a time range out of a cached source and re-encodes it for delivery:
//! H.264 high profile, yuv420p, AAC 320k, faststart container layout, with
//! an orientation-aware resolution cap that never upscales.

use std::path::Path;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::encoder::EncoderProfile;
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_dimensions;

/// Decrease-only scale filter for an orientation class.
///
/// Landscape output is bounded to 1920×1080, portrait to 1080×1920; aspect
/// ratio is preserved and sources smaller than the cap pass through at
/// native size.
pub fn scale_filter(portrait: bool) -> &'static str {
    if portrait {
        "scale='min(1080,iw)':'min(1920,ih)':force_original_aspect_ratio=decrease:flags=lanczos"
    } else {
        "scale='min(1920,iw)':'min(1080,ih)':force_original_aspect_ratio=decrease:flags=lanczos"
    }
}

/// Cut `[start, end)` out of `input` into `output` using the detected
/// encoder profile.
pub async fn cut(
    input: impl AsRef<Path>,
    start: f64,
    end: f64,
    output: impl AsRef<Path>,
    profile: &EncoderProfile,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    if end <= start {
        return Err(MediaError::InvalidRange { start, end });
    }
    let duration = end - start;

    // Orientation of the actual input decides the cap; an unreadable probe
    // falls back to the landscape bound.
    let portrait = probe_dimensions(input)
        .await
        .map(|d| d.is_portrait())
        .unwrap_or(false);

    let mut filter = scale_filter(portrait).to_string();
    if let Some(suffix) = &profile.filter_suffix {
        filter.push(',');
        filter.push_str(suffix);
    }

    info!(
        input = %input.display(),
        output = %output.display(),
        start,
        duration,
        portrait,
        encoder = %profile.encoder,
        "Cutting clip"
    );

    let cmd = FfmpegCommand::new(input, output)
        .input_args(profile.input_args.clone())
        .seek(start)
        .duration(duration)
        .video_filter(filter)
        .video_codec(&profile.encoder)
        .output_args(profile.output_args.clone())
        .output_args(["-profile:v", "high", "-pix_fmt", "yuv420p"])
        .audio_codec("aac")
        .audio_bitrate("320k")
        .faststart();

    FfmpegRunner::new().run(&cmd).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cut_rejects_inverted_range() {
        let profile = EncoderProfile::software();
        let err = cut("in.mp4", 10.0, 10.0, "out.mp4", &profile)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::InvalidRange { .. }));

        let err = cut("in.mp4", 10.0, 5.0, "out.mp4", &profile)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MediaError::InvalidRange {
                start,
                end
            } if start == 10.0 && end == 5.0
        ));
    }

    #[test]
    fn test_scale_filter_never_upscales() {
        // min(cap, input) with decrease keeps sub-cap sources at native size
        let landscape = scale_filter(false);
        assert!(landscape.contains("min(1920,iw)"));
        assert!(landscape.contains("min(1080,ih)"));
        assert!(landscape.contains("force_original_aspect_ratio=decrease"));

        let portrait = scale_filter(true);
        assert!(portrait.contains("min(1080,iw)"));
        assert!(portrait.contains("min(1920,ih)"));
        assert!(portrait.contains("force_original_aspect_ratio=decrease"));
    }

    #[test]
    fn test_cut_command_shape() {
        // Mirror of the arg assembly in cut(): quality baseline follows the
        // encoder-specific args.
        let profile = EncoderProfile::software();
        let cmd = FfmpegCommand::new("in.mp4", "out.mp4")
            .input_args(profile.input_args.clone())
            .seek(65.0)
            .duration(60.0)
            .video_filter(scale_filter(false))
            .video_codec(&profile.encoder)
            .output_args(profile.output_args.clone())
            .output_args(["-profile:v", "high", "-pix_fmt", "yuv420p"])
            .audio_codec("aac")
            .audio_bitrate("320k")
            .faststart();

        let args = cmd.build_args();
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"yuv420p".to_string()));
        assert!(args.contains(&"320k".to_string()));
        assert!(args.contains(&"+faststart".to_string()));

        let crf_pos = args.iter().position(|a| a == "-crf").unwrap();
        let profile_pos = args.iter().position(|a| a == "-profile:v").unwrap();
        assert!(crf_pos < profile_pos);
    }
}
