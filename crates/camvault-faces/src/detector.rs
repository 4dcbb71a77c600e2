//! Face detection and encoding using ONNX models.
//!
//! Detection uses UltraFace (version-slim-320); encodings come from
//! MobileFaceNet (w600k_mbf, 512-dim). Detection is independent per
//! frame; there is no tracking across frames.

use std::path::Path;
use std::sync::Mutex;

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use ndarray::Array;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::{debug, info};

use camvault_models::{FaceRegion, ENCODING_DIM};

use crate::error::{FaceError, FaceResult};

// UltraFace-320 input geometry
const DETECT_WIDTH: u32 = 320;
const DETECT_HEIGHT: u32 = 240;

// MobileFaceNet input geometry
const EMBED_SIZE: u32 = 112;

/// Configuration for the face detector.
#[derive(Debug, Clone)]
pub struct FaceDetectorConfig {
    /// Path to the UltraFace detection model
    pub detect_model_path: String,
    /// Path to the MobileFaceNet embedding model
    pub embed_model_path: String,
    /// Minimum detection score to keep a candidate
    pub score_threshold: f32,
    /// IoU threshold for non-maximum suppression
    pub nms_threshold: f32,
    /// Minimum face side length in pixels; smaller regions yield no encoding
    pub min_face_size: u32,
}

impl Default for FaceDetectorConfig {
    fn default() -> Self {
        Self {
            detect_model_path: "models/version-slim-320.onnx".to_string(),
            embed_model_path: "models/w600k_mbf.onnx".to_string(),
            score_threshold: 0.8,
            nms_threshold: 0.45,
            min_face_size: 20,
        }
    }
}

/// Face detector and encoder backed by ONNX Runtime sessions.
#[derive(Debug)]
pub struct FaceDetector {
    detect_session: Mutex<Session>,
    embed_session: Mutex<Session>,
    config: FaceDetectorConfig,
}

impl FaceDetector {
    /// Create a new detector from config.
    ///
    /// Returns an error if either model file is missing or fails to load.
    pub fn new(config: FaceDetectorConfig) -> FaceResult<Self> {
        for model in [&config.detect_model_path, &config.embed_model_path] {
            if !Path::new(model).exists() {
                return Err(FaceError::ModelNotFound(model.clone()));
            }
        }

        let detect_session = Mutex::new(create_session(Path::new(&config.detect_model_path))?);
        let embed_session = Mutex::new(create_session(Path::new(&config.embed_model_path))?);

        info!(
            detect_model = %config.detect_model_path,
            embed_model = %config.embed_model_path,
            "Face detector initialized"
        );

        Ok(Self {
            detect_session,
            embed_session,
            config,
        })
    }

    /// Detect face regions in a single frame.
    pub fn detect(&self, img: &DynamicImage) -> FaceResult<Vec<FaceRegion>> {
        let (orig_w, orig_h) = img.dimensions();
        if orig_w == 0 || orig_h == 0 {
            return Ok(Vec::new());
        }

        let input = preprocess_detect(img)?;
        let (scores, boxes) = self.run_detect(input)?;

        // Reshape flat outputs: scores are [background, face] pairs,
        // boxes are normalized [x1, y1, x2, y2]
        let num_anchors = scores.len() / 2;
        if boxes.len() != num_anchors * 4 {
            return Err(FaceError::inference(format!(
                "score/box count mismatch: {} anchors, {} box values",
                num_anchors,
                boxes.len()
            )));
        }
        let scores = Array::from_shape_vec((num_anchors, 2), scores)
            .map_err(|e| FaceError::inference(format!("failed to reshape scores: {e}")))?;
        let boxes = Array::from_shape_vec((num_anchors, 4), boxes)
            .map_err(|e| FaceError::inference(format!("failed to reshape boxes: {e}")))?;

        let mut candidates = Vec::new();
        for i in 0..num_anchors {
            let score = scores[[i, 1]];
            if score < self.config.score_threshold {
                continue;
            }
            candidates.push(Candidate {
                score,
                x1: boxes[[i, 0]] * orig_w as f32,
                y1: boxes[[i, 1]] * orig_h as f32,
                x2: boxes[[i, 2]] * orig_w as f32,
                y2: boxes[[i, 3]] * orig_h as f32,
            });
        }

        let picked = non_maximum_suppression(candidates, self.config.nms_threshold);

        let mut regions = Vec::new();
        for c in picked {
            let x1 = c.x1.max(0.0) as u32;
            let y1 = c.y1.max(0.0) as u32;
            let x2 = (c.x2 as u32).min(orig_w);
            let y2 = (c.y2 as u32).min(orig_h);
            let region = FaceRegion::new(x1, y1, x2.saturating_sub(x1), y2.saturating_sub(y1));
            if !region.is_degenerate() {
                regions.push(region);
            }
        }

        debug!(count = regions.len(), "Face detection completed");
        Ok(regions)
    }

    /// Compute a 512-dim encoding for a detected face region.
    ///
    /// Fails with [`FaceError::NoEncoding`] for regions smaller than the
    /// configured minimum or outside the frame.
    pub fn encode(&self, img: &DynamicImage, region: &FaceRegion) -> FaceResult<Vec<f32>> {
        let (orig_w, orig_h) = img.dimensions();

        if region.is_degenerate() || region.min_side() < self.config.min_face_size {
            return Err(FaceError::no_encoding(format!(
                "region {}x{} below minimum face size {}",
                region.width, region.height, self.config.min_face_size
            )));
        }
        if region.x >= orig_w || region.y >= orig_h {
            return Err(FaceError::no_encoding("region outside frame"));
        }

        let w = region.width.min(orig_w - region.x);
        let h = region.height.min(orig_h - region.y);
        let face = img.crop_imm(region.x, region.y, w, h);
        let input = preprocess_embed(&face)?;

        let mut encoding = self.run_embed(input)?;
        if encoding.len() != ENCODING_DIM {
            return Err(FaceError::inference(format!(
                "unexpected encoding length {}, expected {}",
                encoding.len(),
                ENCODING_DIM
            )));
        }

        // L2 normalize so Euclidean distances are comparable
        let norm = encoding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in encoding.iter_mut() {
                *x /= norm;
            }
        }

        Ok(encoding)
    }

    /// Run the detection session; returns (scores, boxes) flattened.
    fn run_detect(&self, input: Value) -> FaceResult<(Vec<f32>, Vec<f32>)> {
        let mut session = self
            .detect_session
            .lock()
            .map_err(|_| FaceError::inference("detect session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| FaceError::inference(format!("detection inference failed: {e}")))?;

        // UltraFace output order: [scores, boxes]
        let scores = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| FaceError::inference(format!("failed to extract scores: {e}")))?
            .1
            .to_vec();
        let boxes = outputs[1]
            .try_extract_tensor::<f32>()
            .map_err(|e| FaceError::inference(format!("failed to extract boxes: {e}")))?
            .1
            .to_vec();

        Ok((scores, boxes))
    }

    /// Run the embedding session.
    fn run_embed(&self, input: Value) -> FaceResult<Vec<f32>> {
        let mut session = self
            .embed_session
            .lock()
            .map_err(|_| FaceError::inference("embed session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| FaceError::inference(format!("embedding inference failed: {e}")))?;

        let embedding = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| FaceError::inference(format!("failed to extract embedding: {e}")))?
            .1
            .to_vec();

        Ok(embedding)
    }

    /// Get the configuration.
    pub fn config(&self) -> &FaceDetectorConfig {
        &self.config
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    score: f32,
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl Candidate {
    fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }
}

/// Preprocess for UltraFace: resize to 320x240, normalize (x-127)/128, NCHW.
fn preprocess_detect(img: &DynamicImage) -> FaceResult<Value> {
    let resized = img.resize_exact(DETECT_WIDTH, DETECT_HEIGHT, FilterType::Triangle);
    let rgb = resized.to_rgb8();
    let (w, h) = (DETECT_WIDTH as usize, DETECT_HEIGHT as usize);

    let mut chw_data: Vec<f32> = Vec::with_capacity(3 * h * w);
    for c in 0..3 {
        for y in 0..h {
            for x in 0..w {
                let pixel = rgb.get_pixel(x as u32, y as u32);
                chw_data.push((pixel[c] as f32 - 127.0) / 128.0);
            }
        }
    }

    let shape = vec![1usize, 3, h, w];
    Tensor::from_array((shape, chw_data.into_boxed_slice()))
        .map(Value::from)
        .map_err(|e| FaceError::inference(format!("failed to create tensor: {e}")))
}

/// Preprocess for MobileFaceNet: resize to 112x112, normalize (x-127.5)/128.
fn preprocess_embed(face: &DynamicImage) -> FaceResult<Value> {
    let resized = face.resize_exact(EMBED_SIZE, EMBED_SIZE, FilterType::Triangle);
    let rgb = resized.to_rgb8();
    let size = EMBED_SIZE as usize;

    let mut chw_data: Vec<f32> = Vec::with_capacity(3 * size * size);
    for c in 0..3 {
        for y in 0..size {
            for x in 0..size {
                let pixel = rgb.get_pixel(x as u32, y as u32);
                chw_data.push((pixel[c] as f32 - 127.5) / 128.0);
            }
        }
    }

    let shape = vec![1usize, 3, size, size];
    Tensor::from_array((shape, chw_data.into_boxed_slice()))
        .map(Value::from)
        .map_err(|e| FaceError::inference(format!("failed to create tensor: {e}")))
}

/// Greedy NMS over score-sorted candidates.
fn non_maximum_suppression(mut candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let mut picked: Vec<Candidate> = Vec::new();
    for c in candidates {
        let overlaps = picked.iter().any(|p| compute_iou(&c, p) > iou_threshold);
        if !overlaps {
            picked.push(c);
        }
    }
    picked
}

/// Intersection over union of two candidate boxes.
fn compute_iou(a: &Candidate, b: &Candidate) -> f32 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union = a.area() + b.area() - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

/// Create an ONNX Runtime session with automatic execution provider selection.
fn create_session(model_path: &Path) -> FaceResult<Session> {
    let model_bytes = std::fs::read(model_path)?;

    let mut builder = Session::builder()
        .map_err(|e| FaceError::inference(format!("failed to create session builder: {e}")))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| FaceError::inference(format!("failed to set optimization level: {e}")))?;

    #[cfg(all(target_os = "linux", feature = "cuda"))]
    {
        use ort::execution_providers::CUDAExecutionProvider;
        if let Ok(cuda_builder) = builder
            .clone()
            .with_execution_providers([CUDAExecutionProvider::default().build()])
        {
            if let Ok(session) = cuda_builder.commit_from_memory(&model_bytes) {
                info!("Using CUDA execution provider for face inference");
                return Ok(session);
            }
        }
        debug!("CUDA execution provider not available, falling back to CPU");
    }

    builder
        .commit_from_memory(&model_bytes)
        .map_err(|e| FaceError::inference(format!("failed to load model: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> Candidate {
        Candidate { score, x1, y1, x2, y2 }
    }

    #[test]
    fn test_iou_identical_boxes() {
        let a = candidate(0.0, 0.0, 10.0, 10.0, 0.9);
        assert!((compute_iou(&a, &a) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_iou_disjoint_boxes() {
        let a = candidate(0.0, 0.0, 10.0, 10.0, 0.9);
        let b = candidate(20.0, 20.0, 30.0, 30.0, 0.8);
        assert_eq!(compute_iou(&a, &b), 0.0);
    }

    #[test]
    fn test_nms_suppresses_overlap() {
        let candidates = vec![
            candidate(0.0, 0.0, 10.0, 10.0, 0.9),
            candidate(1.0, 1.0, 11.0, 11.0, 0.8), // heavy overlap with first
            candidate(50.0, 50.0, 60.0, 60.0, 0.7),
        ];
        let picked = non_maximum_suppression(candidates, 0.45);
        assert_eq!(picked.len(), 2);
        assert!((picked[0].score - 0.9).abs() < 0.001);
    }

    #[test]
    fn test_missing_model_errors() {
        let config = FaceDetectorConfig {
            detect_model_path: "/nonexistent/detect.onnx".to_string(),
            ..Default::default()
        };
        let err = FaceDetector::new(config).unwrap_err();
        assert!(matches!(err, FaceError::ModelNotFound(_)));
    }
}
