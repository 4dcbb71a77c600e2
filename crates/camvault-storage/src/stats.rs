//! Filesystem usage and directory statistics.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use nix::sys::statvfs::statvfs;
use tracing::warn;

use camvault_models::{
    CleanupEligibility, DirectoryStats, DiskUsage, FileRecord, StorageStats,
};

use crate::error::{StorageError, StorageResult};
use crate::StorageConfig;

/// Disk usage for the filesystem containing `path`.
pub fn disk_usage(path: impl AsRef<Path>) -> StorageResult<DiskUsage> {
    let vfs = statvfs(path.as_ref()).map_err(|e| StorageError::statvfs(e.to_string()))?;

    let frag = vfs.fragment_size() as u64;
    let total = vfs.blocks() as u64 * frag;
    // Free space as seen by unprivileged users
    let free = vfs.blocks_available() as u64 * frag;
    let used = total.saturating_sub(vfs.blocks_free() as u64 * frag);

    Ok(DiskUsage::new(total, used, free))
}

/// Aggregate statistics for a directory tree.
///
/// A missing directory yields empty statistics rather than an error, so
/// callers can report on directories that have not been created yet.
pub fn directory_stats(dir: impl AsRef<Path>) -> StorageResult<DirectoryStats> {
    let dir = dir.as_ref();
    let mut stats = DirectoryStats::default();

    if !dir.is_dir() {
        return Ok(stats);
    }

    walk(dir, &mut stats)?;
    Ok(stats)
}

fn walk(dir: &Path, stats: &mut DirectoryStats) -> StorageResult<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            walk(&path, stats)?;
            continue;
        }

        let meta = match entry.metadata() {
            Ok(meta) => meta,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable file");
                continue;
            }
        };

        let modified_at = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()));

        stats.record(
            FileRecord {
                path,
                size_bytes: meta.len(),
                modified_at,
            },
            extension,
        );
    }
    Ok(())
}

/// A point-in-time snapshot of managed storage, always derived from the
/// live filesystem.
pub fn storage_stats(cfg: &StorageConfig) -> StorageResult<StorageStats> {
    let video_disk = if cfg.video_dir.exists() {
        Some(disk_usage(&cfg.video_dir)?)
    } else {
        None
    };

    let mut files = directory_stats(&cfg.video_dir)?;
    files.merge(directory_stats(&cfg.results_dir)?);

    let cutoff = Utc::now() - Duration::days(i64::from(cfg.retention_days));
    let mut eligible_files = 0u64;
    let mut eligible_bytes = 0u64;
    for dir in [&cfg.video_dir, &cfg.results_dir] {
        for record in eligible_records(dir, cutoff)? {
            eligible_files += 1;
            eligible_bytes += record.size_bytes;
        }
    }

    Ok(StorageStats {
        video_disk,
        files,
        cleanup: CleanupEligibility {
            retention_days: cfg.retention_days,
            cutoff,
            eligible_files,
            eligible_bytes,
        },
        collected_at: Utc::now(),
    })
}

/// Files under `dir` whose mtime is strictly before `cutoff`.
pub(crate) fn eligible_records(
    dir: &Path,
    cutoff: DateTime<Utc>,
) -> StorageResult<Vec<FileRecord>> {
    let mut records = Vec::new();
    if !dir.is_dir() {
        return Ok(records);
    }
    collect(dir, &mut records)?;
    records.retain(|r| r.modified_at < cutoff);
    Ok(records)
}

pub(crate) fn collect(dir: &Path, records: &mut Vec<FileRecord>) -> StorageResult<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect(&path, records)?;
            continue;
        }
        if let Ok(meta) = entry.metadata() {
            let modified_at = meta
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            records.push(FileRecord {
                path,
                size_bytes: meta.len(),
                modified_at,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_disk_usage_reports_nonzero_total() {
        let dir = TempDir::new().unwrap();
        let usage = disk_usage(dir.path()).unwrap();
        assert!(usage.total_bytes > 0);
        assert!(usage.percent_used >= 0.0 && usage.percent_used <= 100.0);
    }

    #[test]
    fn test_directory_stats_missing_dir_is_empty() {
        let stats = directory_stats("/nonexistent/camvault/test/dir").unwrap();
        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.total_bytes, 0);
    }

    #[test]
    fn test_directory_stats_counts_nested_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.mp4"), vec![0u8; 100]).unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/b.json"), vec![0u8; 50]).unwrap();
        std::fs::write(dir.path().join("sub/c.MP4"), vec![0u8; 25]).unwrap();

        let stats = directory_stats(dir.path()).unwrap();
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_bytes, 175);
        assert_eq!(stats.files_by_extension[".mp4"], 2);
        assert_eq!(stats.files_by_extension[".json"], 1);
    }

    #[test]
    fn test_storage_stats_aggregates_both_dirs() {
        let root = TempDir::new().unwrap();
        let cfg = StorageConfig {
            video_dir: root.path().join("videos"),
            results_dir: root.path().join("results"),
            ..Default::default()
        };
        std::fs::create_dir(&cfg.video_dir).unwrap();
        std::fs::create_dir(&cfg.results_dir).unwrap();
        std::fs::write(cfg.video_dir.join("a.mp4"), vec![0u8; 10]).unwrap();
        std::fs::write(cfg.results_dir.join("a_results.json"), vec![0u8; 5]).unwrap();

        let stats = storage_stats(&cfg).unwrap();
        assert!(stats.video_disk.is_some());
        assert_eq!(stats.files.total_files, 2);
        assert_eq!(stats.files.total_bytes, 15);
        // Fresh files are inside the retention window
        assert_eq!(stats.cleanup.eligible_files, 0);
    }
}
