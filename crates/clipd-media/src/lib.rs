//! yt-dlp and FFmpeg CLI orchestration for clip extraction.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building and execution
//! - Startup hardware-encoder capability detection with a software fallback
//! - Source resolution and an id-keyed disk cache over yt-dlp
//! - Orientation-aware clip transcoding (never upscales)
//! - Cross-device-safe file moves

pub mod command;
pub mod encoder;
pub mod error;
pub mod fs_utils;
pub mod probe;
pub mod resolver;
pub mod transcode;

pub use command::{check_ffmpeg, check_ffprobe, check_ytdlp, FfmpegCommand, FfmpegRunner};
pub use encoder::{detect_encoder, select_encoder, EncoderProfile};
pub use error::{MediaError, MediaResult};
pub use fs_utils::move_file;
pub use probe::{probe_dimensions, Dimensions};
pub use resolver::SourceResolver;
pub use transcode::{cut, scale_filter};
