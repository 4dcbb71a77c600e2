//! Per-video processing results.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::face::FaceDetection;
use crate::video::VideoMetadata;

/// Outcome of processing a single video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Processing completed successfully
    Completed,
    /// Processing failed
    Failed,
}

/// The full analysis result for one video.
///
/// Never mutated after creation; persisted as `<video-stem>_results.json`
/// next to the other results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// Source video path
    pub video_path: PathBuf,

    /// Probed metadata (absent when probing itself failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VideoMetadata>,

    /// Every face detection across all sampled frames, in frame order
    pub detections: Vec<FaceDetection>,

    /// The subset of detections matched to a known identity
    pub recognized: Vec<FaceDetection>,

    /// Wall-clock processing duration in seconds
    pub processing_secs: f64,

    /// When processing finished
    pub finished_at: DateTime<Utc>,

    /// Completion status
    pub status: ProcessingStatus,

    /// Error message when status is Failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingResult {
    /// Build a completed result. The recognized subset is derived from
    /// the detections here, not supplied by the caller.
    pub fn completed(
        video_path: PathBuf,
        metadata: VideoMetadata,
        detections: Vec<FaceDetection>,
        processing_secs: f64,
    ) -> Self {
        let recognized = detections
            .iter()
            .filter(|d| d.is_recognized())
            .cloned()
            .collect();

        Self {
            video_path,
            metadata: Some(metadata),
            detections,
            recognized,
            processing_secs,
            finished_at: Utc::now(),
            status: ProcessingStatus::Completed,
            error: None,
        }
    }

    /// Build a failed result carrying the error message.
    pub fn failed(video_path: PathBuf, error: impl Into<String>, processing_secs: f64) -> Self {
        Self {
            video_path,
            metadata: None,
            detections: Vec::new(),
            recognized: Vec::new(),
            processing_secs,
            finished_at: Utc::now(),
            status: ProcessingStatus::Failed,
            error: Some(error.into()),
        }
    }

    /// File name the result is persisted under: `<video-stem>_results.json`.
    pub fn results_file_name(&self) -> String {
        let stem = self
            .video_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "video".to_string());
        format!("{stem}_results.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::UNKNOWN_FACE;
    use crate::region::FaceRegion;

    fn detection(name: &str, frame: u64) -> FaceDetection {
        FaceDetection {
            frame_index: frame,
            timestamp_secs: frame as f64 / 30.0,
            region: FaceRegion::new(0, 0, 64, 64),
            name: name.to_string(),
            confidence: if name == UNKNOWN_FACE { 0.0 } else { 0.8 },
        }
    }

    fn metadata() -> VideoMetadata {
        VideoMetadata::new(1920, 1080, 30.0, 12.0, "h264", Utc::now(), 1_000_000, None)
    }

    #[test]
    fn test_recognized_subset_derived() {
        let detections = vec![
            detection("alice", 0),
            detection(UNKNOWN_FACE, 5),
            detection("bob", 10),
        ];
        let result =
            ProcessingResult::completed(PathBuf::from("/tmp/clip.mp4"), metadata(), detections, 1.5);

        assert_eq!(result.status, ProcessingStatus::Completed);
        assert_eq!(result.detections.len(), 3);
        assert_eq!(result.recognized.len(), 2);
        assert!(result.recognized.iter().all(|d| d.is_recognized()));
    }

    #[test]
    fn test_results_file_name() {
        let result = ProcessingResult::failed(PathBuf::from("/videos/front_door.mp4"), "probe", 0.1);
        assert_eq!(result.results_file_name(), "front_door_results.json");
    }

    #[test]
    fn test_failed_result() {
        let result = ProcessingResult::failed(PathBuf::from("/v/a.mp4"), "no video stream", 0.2);
        assert_eq!(result.status, ProcessingStatus::Failed);
        assert!(result.metadata.is_none());
        assert_eq!(result.error.as_deref(), Some("no video stream"));
    }
}
