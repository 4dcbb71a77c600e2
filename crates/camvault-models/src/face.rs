//! Known identities and per-frame face detections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::region::FaceRegion;

/// Dimension of a face encoding vector (MobileFaceNet output).
pub const ENCODING_DIM: usize = 512;

/// Sentinel name returned when a face matches no gallery entry.
pub const UNKNOWN_FACE: &str = "Unknown";

/// A known identity stored in the face gallery.
///
/// Names are not unique: one person may be enrolled from several images,
/// each contributing its own encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnownFace {
    /// Person name (non-unique)
    pub name: String,

    /// Face encoding vector (length [`ENCODING_DIM`])
    pub encoding: Vec<f32>,

    /// Minimum confidence (1 - distance) required to accept a match
    /// against this entry
    pub confidence_threshold: f32,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// When the entry was enrolled
    pub added_at: DateTime<Utc>,

    /// Source image the encoding was computed from
    pub image_path: String,

    /// Last time this identity was matched in a video
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,

    /// Cumulative number of matches against this identity
    #[serde(default)]
    pub times_seen: u64,
}

impl KnownFace {
    /// Create a new gallery entry.
    pub fn new(
        name: impl Into<String>,
        encoding: Vec<f32>,
        confidence_threshold: f32,
        description: impl Into<String>,
        image_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            encoding,
            confidence_threshold,
            description: description.into(),
            added_at: Utc::now(),
            image_path: image_path.into(),
            last_seen: None,
            times_seen: 0,
        }
    }

    /// Record a successful match against this entry.
    pub fn record_sighting(&mut self) {
        self.last_seen = Some(Utc::now());
        self.times_seen += 1;
    }
}

/// A single face observed in a sampled video frame.
///
/// Detections are ephemeral: produced per analyzed frame and aggregated
/// into a [`crate::ProcessingResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceDetection {
    /// Zero-based frame index within the source video
    pub frame_index: u64,

    /// Position in the video in seconds (frame index / fps)
    pub timestamp_secs: f64,

    /// Bounding region in frame pixels
    pub region: FaceRegion,

    /// Matched identity, or [`UNKNOWN_FACE`]
    pub name: String,

    /// Match confidence (1 - distance); 0.0 for unknown faces
    pub confidence: f32,
}

impl FaceDetection {
    /// Whether this detection matched a known identity.
    pub fn is_recognized(&self) -> bool {
        self.name != UNKNOWN_FACE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sighting() {
        let mut face = KnownFace::new("alice", vec![0.0; ENCODING_DIM], 0.6, "", "alice.jpg");
        assert!(face.last_seen.is_none());

        face.record_sighting();
        face.record_sighting();

        assert_eq!(face.times_seen, 2);
        assert!(face.last_seen.is_some());
    }

    #[test]
    fn test_detection_recognized() {
        let region = FaceRegion::new(0, 0, 10, 10);
        let known = FaceDetection {
            frame_index: 5,
            timestamp_secs: 0.2,
            region,
            name: "alice".to_string(),
            confidence: 0.9,
        };
        let unknown = FaceDetection {
            name: UNKNOWN_FACE.to_string(),
            confidence: 0.0,
            ..known.clone()
        };

        assert!(known.is_recognized());
        assert!(!unknown.is_recognized());
    }

    #[test]
    fn test_known_face_roundtrip() {
        let face = KnownFace::new("bob", vec![0.5; 4], 0.7, "neighbor", "bob.png");
        let json = serde_json::to_string(&face).unwrap();
        let back: KnownFace = serde_json::from_str(&json).unwrap();

        assert_eq!(back.name, "bob");
        assert_eq!(back.encoding, vec![0.5; 4]);
        assert!((back.confidence_threshold - 0.7).abs() < f32::EPSILON);
        assert_eq!(back.times_seen, 0);
    }
}
