//! Pipeline events and the sink boundary.
//!
//! Delivery mechanics (push notifications, webhooks) live outside this
//! process; an [`EventSink`] implementation is the seam they plug into.

use std::path::PathBuf;

use tracing::{info, warn};

/// Something observers may want to know about.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A sampled frame contained a face that matched no known identity
    UnknownFaceDetected {
        video: PathBuf,
        frame_index: u64,
        timestamp_secs: f64,
    },
    /// Disk usage crossed the cleanup threshold
    StorageThresholdExceeded { percent_used: f64, threshold: f64 },
    /// A video finished processing
    VideoProcessed {
        video: PathBuf,
        detections: usize,
        recognized: usize,
    },
}

/// Receives pipeline events.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &Event);
}

/// Sink that writes structured log events.
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn publish(&self, event: &Event) {
        match event {
            Event::UnknownFaceDetected {
                video,
                frame_index,
                timestamp_secs,
            } => {
                warn!(
                    video = %video.display(),
                    frame_index,
                    timestamp_secs,
                    "Unknown face detected"
                );
            }
            Event::StorageThresholdExceeded {
                percent_used,
                threshold,
            } => {
                warn!(percent_used, threshold, "Storage threshold exceeded");
            }
            Event::VideoProcessed {
                video,
                detections,
                recognized,
            } => {
                info!(
                    video = %video.display(),
                    detections,
                    recognized,
                    "Video processed"
                );
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::CaptureSink;
    use super::*;

    #[test]
    fn test_capture_sink_records_events() {
        let sink = CaptureSink::default();
        let event = Event::StorageThresholdExceeded {
            percent_used: 95.0,
            threshold: 90.0,
        };
        sink.publish(&event);
        sink.publish(&Event::VideoProcessed {
            video: PathBuf::from("/v/a.mp4"),
            detections: 3,
            recognized: 1,
        });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], event);
    }
}
