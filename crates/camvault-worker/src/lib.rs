//! Video ingestion worker.
//!
//! Watches a directory for finished camera recordings, runs face
//! detection and recognition over sampled frames, persists per-video
//! results, and keeps storage within its retention window.

pub mod config;
pub mod error;
pub mod events;
pub mod metrics;
pub mod pipeline;
pub mod processor;
pub mod watcher;

pub use config::Config;
pub use error::{WorkerError, WorkerResult};
pub use events::{Event, EventSink, LogSink};
pub use pipeline::Pipeline;
pub use processor::{process_video, stitch_videos, ProcessingContext};
pub use watcher::DirectoryWatcher;
