//! Face detection, encoding, and the known-face gallery.
//!
//! This crate provides:
//! - ONNX-based face detection (UltraFace-320) and 512-dim face
//!   encodings (MobileFaceNet) via `ort`
//! - A persisted gallery of known identities with nearest-neighbor
//!   matching behind a two-stage confidence gate

pub mod detector;
pub mod error;
pub mod gallery;

pub use detector::{FaceDetector, FaceDetectorConfig};
pub use error::{FaceError, FaceResult};
pub use gallery::{
    EnrollmentReport, FaceGallery, GalleryStats, MatchResult, MultiFacePolicy, ValidationReport,
};
