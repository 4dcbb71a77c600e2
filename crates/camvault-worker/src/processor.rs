//! Per-video processing.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use camvault_faces::{FaceDetector, FaceDetectorConfig, FaceError, FaceGallery};
use camvault_media::{concat_videos, probe_video, sample_frames};
use camvault_models::{FaceDetection, ProcessingResult};

use crate::config::Config;
use crate::error::WorkerResult;
use crate::events::{Event, EventSink};
use crate::metrics;

/// Everything a video task needs, shared across concurrent tasks.
pub struct ProcessingContext {
    pub config: Config,
    pub detector: FaceDetector,
    pub gallery: Arc<RwLock<FaceGallery>>,
    pub events: Arc<dyn EventSink>,
}

impl ProcessingContext {
    /// Build the context: loads the inference sessions and the gallery.
    pub fn new(config: Config, events: Arc<dyn EventSink>) -> WorkerResult<Self> {
        let detector = FaceDetector::new(FaceDetectorConfig {
            detect_model_path: config.detect_model_path.to_string_lossy().into_owned(),
            embed_model_path: config.embed_model_path.to_string_lossy().into_owned(),
            ..Default::default()
        })?;

        let mut gallery = FaceGallery::new();
        gallery.load(&config.gallery_path)?;

        if config.enroll_dir.is_dir() {
            let report = gallery.add_directory(
                &detector,
                &config.enroll_dir,
                config.default_confidence_threshold,
                config.multi_face_policy,
            )?;
            if report.failed > 0 {
                warn!(errors = ?report.errors, "Some enrollment images failed");
            }
        }

        Ok(Self {
            config,
            detector,
            gallery: Arc::new(RwLock::new(gallery)),
            events,
        })
    }
}

/// Analyze one video end to end.
///
/// Probes metadata, samples every `frame_skip`-th frame into a scratch
/// directory, detects and matches faces per frame, records sightings for
/// recognized identities, persists the result file, and publishes
/// events. Errors propagate; the caller decides what a failed video
/// means for the loop.
pub async fn process_video(
    ctx: &ProcessingContext,
    path: &Path,
) -> WorkerResult<ProcessingResult> {
    let started = Instant::now();
    info!(video = %path.display(), "Processing video");

    let metadata = probe_video(path).await?;
    debug!(
        resolution = %metadata.resolution(),
        fps = metadata.fps,
        duration_secs = metadata.duration_secs,
        "Video probed"
    );

    let scratch = tempfile::tempdir()?;
    let frames = sample_frames(path, ctx.config.frame_skip, scratch.path()).await?;

    let mut detections = Vec::new();
    for frame in &frames {
        let img = image::open(&frame.path)?;
        let regions = ctx.detector.detect(&img)?;

        for region in regions {
            let encoding = match ctx.detector.encode(&img, &region) {
                Ok(encoding) => encoding,
                Err(FaceError::NoEncoding(reason)) => {
                    debug!(frame_index = frame.frame_index, reason, "Skipping region");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let matched = ctx
                .gallery
                .read()
                .await
                .match_encoding(&encoding, ctx.config.match_tolerance);

            let timestamp_secs = if metadata.fps > 0.0 {
                frame.frame_index as f64 / metadata.fps
            } else {
                0.0
            };

            detections.push(FaceDetection {
                frame_index: frame.frame_index,
                timestamp_secs,
                region,
                name: matched.name,
                confidence: matched.confidence,
            });
        }
    }

    record_sightings(ctx, &detections).await;

    if let Some(unknown) = detections.iter().find(|d| !d.is_recognized()) {
        ctx.events.publish(&Event::UnknownFaceDetected {
            video: path.to_path_buf(),
            frame_index: unknown.frame_index,
            timestamp_secs: unknown.timestamp_secs,
        });
    }

    let result = ProcessingResult::completed(
        path.to_path_buf(),
        metadata,
        detections,
        started.elapsed().as_secs_f64(),
    );

    persist_result(&ctx.config.results_dir, &result)?;

    metrics::record_video_processed("completed", result.processing_secs);
    metrics::record_faces(result.detections.len() as u64, result.recognized.len() as u64);

    ctx.events.publish(&Event::VideoProcessed {
        video: path.to_path_buf(),
        detections: result.detections.len(),
        recognized: result.recognized.len(),
    });

    info!(
        video = %path.display(),
        detections = result.detections.len(),
        recognized = result.recognized.len(),
        processing_secs = result.processing_secs,
        "Video processed"
    );

    Ok(result)
}

/// Update last-seen bookkeeping for every recognized identity and
/// persist the gallery. A failed save is logged, not fatal; the next
/// successful save catches up.
async fn record_sightings(ctx: &ProcessingContext, detections: &[FaceDetection]) {
    let mut names: Vec<&str> = detections
        .iter()
        .filter(|d| d.is_recognized())
        .map(|d| d.name.as_str())
        .collect();
    names.sort_unstable();
    names.dedup();

    if names.is_empty() {
        return;
    }

    let mut gallery = ctx.gallery.write().await;
    for name in names {
        gallery.record_sighting(name);
    }
    if let Err(e) = gallery.save() {
        warn!(error = %e, "Failed to persist sighting update");
    }
}

/// Write the result file as `<stem>_results.json` under `results_dir`.
pub fn persist_result(results_dir: &Path, result: &ProcessingResult) -> WorkerResult<PathBuf> {
    std::fs::create_dir_all(results_dir)?;
    let target = results_dir.join(result.results_file_name());
    std::fs::write(&target, serde_json::to_vec_pretty(result)?)?;
    Ok(target)
}

/// Concatenate videos into one file, ordered by recording time.
///
/// Ordering uses the probed creation timestamp, falling back to the
/// filesystem mtime for files ffprobe cannot read.
pub async fn stitch_videos(inputs: &[PathBuf], output: impl AsRef<Path>) -> WorkerResult<()> {
    let mut ordered: Vec<(DateTime<Utc>, PathBuf)> = Vec::with_capacity(inputs.len());
    for path in inputs {
        let recorded_at = match probe_video(path).await {
            Ok(metadata) => metadata.created_at,
            Err(e) => {
                warn!(video = %path.display(), error = %e, "Probe failed, ordering by mtime");
                std::fs::metadata(path)?
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or_else(|_| Utc::now())
            }
        };
        ordered.push((recorded_at, path.clone()));
    }
    ordered.sort_by_key(|(recorded_at, _)| *recorded_at);

    let sorted: Vec<PathBuf> = ordered.into_iter().map(|(_, path)| path).collect();
    concat_videos(&sorted, output.as_ref()).await?;

    info!(
        inputs = sorted.len(),
        output = %output.as_ref().display(),
        "Videos stitched"
    );
    Ok(())
}
