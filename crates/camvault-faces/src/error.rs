//! Error types for face operations.

use thiserror::Error;

/// Result type for face operations.
pub type FaceResult<T> = Result<T, FaceError>;

/// Errors that can occur during face detection, encoding, and gallery
/// management.
#[derive(Debug, Error)]
pub enum FaceError {
    #[error("No face found in image")]
    NoFaceFound,

    #[error("Multiple faces found in image")]
    MultipleFaces,

    #[error("No encoding could be computed: {0}")]
    NoEncoding(String),

    #[error("Gallery has no target path; load or create it first")]
    NoGalleryPath,

    #[error("Gallery corrupt: {0}")]
    Corrupt(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FaceError {
    /// Create an inference failure error.
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference(message.into())
    }

    /// Create a no-encoding failure error.
    pub fn no_encoding(message: impl Into<String>) -> Self {
        Self::NoEncoding(message.into())
    }
}
