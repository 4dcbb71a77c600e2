//! FFmpeg/FFprobe CLI wrappers for camvault.
//!
//! This crate provides:
//! - Video probing into [`camvault_models::VideoMetadata`]
//! - Sampled frame extraction (every Nth frame) for face analysis
//! - Lossless concatenation of already-encoded recordings

pub mod command;
pub mod concat;
pub mod error;
pub mod frames;
pub mod probe;

pub use command::{check_ffmpeg, check_ffprobe, run_ffmpeg};
pub use concat::concat_videos;
pub use error::{MediaError, MediaResult};
pub use frames::{sample_frames, SampledFrame};
pub use probe::probe_video;
