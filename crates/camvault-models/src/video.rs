//! Probed video metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata extracted from a video file via ffprobe.
///
/// Immutable once constructed; derived fields (bitrate, resolution) are
/// computed at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
    /// Duration in seconds (container-level)
    pub duration_secs: f64,
    /// Video codec name
    pub codec: String,
    /// Filesystem creation timestamp
    pub created_at: DateTime<Utc>,
    /// File size in bytes
    pub file_size: u64,
    /// Bitrate in bits/second (container-reported, or derived from
    /// size and duration when absent)
    pub bitrate_bps: u64,
}

impl VideoMetadata {
    /// Create metadata, deriving the bitrate from file size and duration
    /// when the container does not report one.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        width: u32,
        height: u32,
        fps: f64,
        duration_secs: f64,
        codec: impl Into<String>,
        created_at: DateTime<Utc>,
        file_size: u64,
        reported_bitrate: Option<u64>,
    ) -> Self {
        let bitrate_bps = reported_bitrate.unwrap_or_else(|| {
            if duration_secs > 0.0 {
                ((file_size as f64 * 8.0) / duration_secs) as u64
            } else {
                0
            }
        });

        Self {
            width,
            height,
            fps,
            duration_secs,
            codec: codec.into(),
            created_at,
            file_size,
            bitrate_bps,
        }
    }

    /// Resolution as a "WxH" string.
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_bitrate() {
        // 10 MB over 10 seconds = 8 Mbit/s
        let meta = VideoMetadata::new(
            1920,
            1080,
            30.0,
            10.0,
            "h264",
            Utc::now(),
            10_000_000,
            None,
        );
        assert_eq!(meta.bitrate_bps, 8_000_000);
    }

    #[test]
    fn test_reported_bitrate_preferred() {
        let meta = VideoMetadata::new(
            1280,
            720,
            25.0,
            10.0,
            "hevc",
            Utc::now(),
            10_000_000,
            Some(4_500_000),
        );
        assert_eq!(meta.bitrate_bps, 4_500_000);
    }

    #[test]
    fn test_zero_duration_bitrate() {
        let meta = VideoMetadata::new(640, 480, 30.0, 0.0, "h264", Utc::now(), 1024, None);
        assert_eq!(meta.bitrate_bps, 0);
    }

    #[test]
    fn test_resolution_string() {
        let meta = VideoMetadata::new(1920, 1080, 30.0, 1.0, "h264", Utc::now(), 1, None);
        assert_eq!(meta.resolution(), "1920x1080");
    }
}
