//! Shared data models for camvault.
//!
//! This crate provides Serde-serializable types for:
//! - Known faces and per-frame face detections
//! - Probed video metadata
//! - Per-video processing results
//! - Storage statistics and cleanup reports

pub mod face;
pub mod region;
pub mod result;
pub mod storage;
pub mod video;

// Re-export common types
pub use face::{FaceDetection, KnownFace, ENCODING_DIM, UNKNOWN_FACE};
pub use region::FaceRegion;
pub use result::{ProcessingResult, ProcessingStatus};
pub use storage::{
    CleanupEligibility, CleanupReport, DirectoryStats, DiskUsage, FileRecord, StorageStats,
};
pub use video::VideoMetadata;
