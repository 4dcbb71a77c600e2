//! Storage statistics and cleanup reporting.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Disk usage for a mounted filesystem.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DiskUsage {
    /// Total capacity in bytes
    pub total_bytes: u64,
    /// Used bytes
    pub used_bytes: u64,
    /// Free bytes available to unprivileged users
    pub free_bytes: u64,
    /// Used capacity as a percentage (0.0 - 100.0)
    pub percent_used: f64,
}

impl DiskUsage {
    /// Create disk usage, deriving the percentage.
    pub fn new(total_bytes: u64, used_bytes: u64, free_bytes: u64) -> Self {
        let percent_used = if total_bytes > 0 {
            (used_bytes as f64 / total_bytes as f64) * 100.0
        } else {
            0.0
        };
        Self {
            total_bytes,
            used_bytes,
            free_bytes,
            percent_used,
        }
    }
}

/// A single file observed during a directory walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
}

/// Aggregate statistics for one or more directories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryStats {
    /// Total number of files
    pub total_files: u64,
    /// Total size in bytes
    pub total_bytes: u64,
    /// File count per lowercase extension (".mp4" -> 12)
    pub files_by_extension: HashMap<String, u64>,
    /// Oldest file by modification time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_file: Option<FileRecord>,
    /// Newest file by modification time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_file: Option<FileRecord>,
}

impl DirectoryStats {
    /// Fold a file observation into the aggregate.
    pub fn record(&mut self, record: FileRecord, extension: Option<String>) {
        self.total_files += 1;
        self.total_bytes += record.size_bytes;

        if let Some(ext) = extension {
            *self.files_by_extension.entry(ext).or_insert(0) += 1;
        }

        let older = self
            .oldest_file
            .as_ref()
            .map(|f| record.modified_at < f.modified_at)
            .unwrap_or(true);
        if older {
            self.oldest_file = Some(record.clone());
        }

        let newer = self
            .newest_file
            .as_ref()
            .map(|f| record.modified_at > f.modified_at)
            .unwrap_or(true);
        if newer {
            self.newest_file = Some(record);
        }
    }

    /// Merge another aggregate into this one.
    pub fn merge(&mut self, other: DirectoryStats) {
        self.total_files += other.total_files;
        self.total_bytes += other.total_bytes;

        for (ext, count) in other.files_by_extension {
            *self.files_by_extension.entry(ext).or_insert(0) += count;
        }

        if let Some(oldest) = other.oldest_file {
            let older = self
                .oldest_file
                .as_ref()
                .map(|f| oldest.modified_at < f.modified_at)
                .unwrap_or(true);
            if older {
                self.oldest_file = Some(oldest);
            }
        }

        if let Some(newest) = other.newest_file {
            let newer = self
                .newest_file
                .as_ref()
                .map(|f| newest.modified_at > f.modified_at)
                .unwrap_or(true);
            if newer {
                self.newest_file = Some(newest);
            }
        }
    }
}

/// How much data is currently past the retention window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupEligibility {
    /// Configured retention window in days
    pub retention_days: u32,
    /// Files older than this are eligible for deletion
    pub cutoff: DateTime<Utc>,
    /// Eligible file count
    pub eligible_files: u64,
    /// Eligible bytes
    pub eligible_bytes: u64,
}

/// A point-in-time view of managed storage.
///
/// Always derived from the live filesystem; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageStats {
    /// Disk usage for the filesystem holding the video directory,
    /// absent when the directory does not exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_disk: Option<DiskUsage>,
    /// Aggregate file statistics across the video and results directories
    pub files: DirectoryStats,
    /// Retention eligibility snapshot
    pub cleanup: CleanupEligibility,
    /// When the snapshot was taken
    pub collected_at: DateTime<Utc>,
}

/// Outcome of a retention sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Files examined
    pub files_scanned: u64,
    /// Files deleted (or that would be deleted under dry_run)
    pub files_deleted: u64,
    /// Bytes freed (or that would be freed under dry_run)
    pub bytes_freed: u64,
    /// Paths deleted, in walk order
    pub deleted_files: Vec<PathBuf>,
    /// Per-file errors; these never abort the sweep
    pub errors: Vec<String>,
    /// Whether this was a dry run
    pub dry_run: bool,
}
