//! Disk statistics, retention cleanup, and the storage monitor.
//!
//! This crate provides:
//! - Filesystem usage via `statvfs` and recursive directory statistics
//! - Age-based retention cleanup with a dry-run mode
//! - A background monitor that triggers cleanup when disk usage crosses
//!   a configured threshold

pub mod cleanup;
pub mod error;
pub mod files;
pub mod monitor;
pub mod stats;

pub use cleanup::cleanup;
pub use error::{StorageError, StorageResult};
pub use files::{copy_file, delete_file, list_files, move_file};
pub use monitor::{StorageMonitor, ThresholdAlert};
pub use stats::{directory_stats, disk_usage, storage_stats};

use std::path::PathBuf;
use std::time::Duration;

/// Settings shared by the statistics, cleanup, and monitor paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding incoming and stitched videos
    pub video_dir: PathBuf,
    /// Directory holding per-video result files
    pub results_dir: PathBuf,
    /// Files older than this many days are eligible for deletion
    pub retention_days: u32,
    /// Disk usage percentage above which the monitor forces a cleanup
    pub cleanup_threshold_percent: f64,
    /// How often the monitor re-checks disk usage
    pub monitor_interval: Duration,
    /// Sleep after a failed monitor iteration
    pub error_backoff: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            video_dir: PathBuf::from("videos"),
            results_dir: PathBuf::from("results"),
            retention_days: 30,
            cleanup_threshold_percent: 90.0,
            monitor_interval: Duration::from_secs(3600),
            error_backoff: Duration::from_secs(7200),
        }
    }
}
