//! Prometheus metrics for the worker.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

use crate::error::{WorkerError, WorkerResult};

/// Metric names as constants for consistency.
pub mod names {
    pub const VIDEOS_PROCESSED_TOTAL: &str = "camvault_videos_processed_total";
    pub const FACES_DETECTED_TOTAL: &str = "camvault_faces_detected_total";
    pub const FACES_RECOGNIZED_TOTAL: &str = "camvault_faces_recognized_total";
    pub const PROCESSING_SECONDS: &str = "camvault_processing_seconds";
}

/// Install the Prometheus exporter when `METRICS_ADDR` is set.
///
/// Metrics are still recorded without it; they just have nowhere to go.
pub fn install_exporter() -> WorkerResult<()> {
    let addr = match std::env::var("METRICS_ADDR") {
        Ok(addr) => addr,
        Err(_) => return Ok(()),
    };

    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| WorkerError::config_error(format!("invalid METRICS_ADDR: {e}")))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| {
            WorkerError::config_error(format!("failed to install Prometheus exporter: {e}"))
        })?;

    info!(%addr, "Prometheus exporter listening");
    Ok(())
}

/// Record a finished video with its completion status.
pub fn record_video_processed(status: &str, duration_secs: f64) {
    let labels = [("status", status.to_string())];
    counter!(names::VIDEOS_PROCESSED_TOTAL, &labels).increment(1);
    histogram!(names::PROCESSING_SECONDS).record(duration_secs);
}

/// Record face detections and the recognized subset for one video.
pub fn record_faces(detected: u64, recognized: u64) {
    counter!(names::FACES_DETECTED_TOTAL).increment(detected);
    counter!(names::FACES_RECOGNIZED_TOTAL).increment(recognized);
}
