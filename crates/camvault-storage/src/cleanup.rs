//! Age-based retention cleanup.

use chrono::{Duration, Utc};
use metrics::counter;
use tracing::{info, warn};

use camvault_models::CleanupReport;

use crate::error::StorageResult;
use crate::stats::eligible_records;
use crate::StorageConfig;

/// Delete files older than the retention window from the video and
/// results directories.
///
/// The cutoff is `now - retention_days`; only files with a modification
/// time strictly before it are touched. With `dry_run` the report shows
/// what would be deleted without removing anything. Per-file deletion
/// errors are recorded in the report and never abort the sweep, so a
/// second run over an unchanged tree deletes nothing.
pub fn cleanup(cfg: &StorageConfig, dry_run: bool) -> StorageResult<CleanupReport> {
    let cutoff = Utc::now() - Duration::days(i64::from(cfg.retention_days));
    let mut report = CleanupReport {
        dry_run,
        ..Default::default()
    };

    for dir in [&cfg.video_dir, &cfg.results_dir] {
        for record in eligible_records(dir, cutoff)? {
            report.files_scanned += 1;

            if dry_run {
                report.files_deleted += 1;
                report.bytes_freed += record.size_bytes;
                report.deleted_files.push(record.path);
                continue;
            }

            match std::fs::remove_file(&record.path) {
                Ok(()) => {
                    report.files_deleted += 1;
                    report.bytes_freed += record.size_bytes;
                    report.deleted_files.push(record.path);
                }
                Err(e) => {
                    warn!(path = %record.path.display(), error = %e, "Failed to delete file");
                    report
                        .errors
                        .push(format!("{}: {}", record.path.display(), e));
                }
            }
        }
    }

    if !dry_run {
        counter!("camvault_cleanup_deleted_total").increment(report.files_deleted);
    }

    info!(
        files_deleted = report.files_deleted,
        bytes_freed = report.bytes_freed,
        dry_run,
        "Cleanup sweep finished"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{set_file_mtime, FileTime};
    use tempfile::TempDir;

    fn config(root: &TempDir, retention_days: u32) -> StorageConfig {
        let cfg = StorageConfig {
            video_dir: root.path().join("videos"),
            results_dir: root.path().join("results"),
            retention_days,
            ..Default::default()
        };
        std::fs::create_dir_all(&cfg.video_dir).unwrap();
        std::fs::create_dir_all(&cfg.results_dir).unwrap();
        cfg
    }

    fn write_aged(path: &std::path::Path, size: usize, age_days: u64) {
        std::fs::write(path, vec![0u8; size]).unwrap();
        let mtime = std::time::SystemTime::now()
            - std::time::Duration::from_secs(age_days * 24 * 3600);
        set_file_mtime(path, FileTime::from_system_time(mtime)).unwrap();
    }

    #[test]
    fn test_cleanup_respects_retention_window() {
        let root = TempDir::new().unwrap();
        let cfg = config(&root, 30);

        write_aged(&cfg.video_dir.join("old.mp4"), 100, 40);
        write_aged(&cfg.video_dir.join("new.mp4"), 50, 5);

        let report = cleanup(&cfg, false).unwrap();
        assert_eq!(report.files_deleted, 1);
        assert_eq!(report.bytes_freed, 100);
        assert!(!cfg.video_dir.join("old.mp4").exists());
        assert!(cfg.video_dir.join("new.mp4").exists());
    }

    #[test]
    fn test_cleanup_dry_run_deletes_nothing() {
        let root = TempDir::new().unwrap();
        let cfg = config(&root, 30);

        write_aged(&cfg.video_dir.join("old.mp4"), 100, 40);
        write_aged(&cfg.results_dir.join("old_results.json"), 20, 40);

        let report = cleanup(&cfg, true).unwrap();
        assert!(report.dry_run);
        assert_eq!(report.files_deleted, 2);
        assert_eq!(report.bytes_freed, 120);
        assert!(cfg.video_dir.join("old.mp4").exists());
        assert!(cfg.results_dir.join("old_results.json").exists());
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let root = TempDir::new().unwrap();
        let cfg = config(&root, 30);

        write_aged(&cfg.video_dir.join("old.mp4"), 100, 40);

        let first = cleanup(&cfg, false).unwrap();
        assert_eq!(first.files_deleted, 1);

        let second = cleanup(&cfg, false).unwrap();
        assert_eq!(second.files_deleted, 0);
        assert_eq!(second.bytes_freed, 0);
        assert!(second.errors.is_empty());
    }

    #[test]
    fn test_cleanup_missing_dirs_is_empty() {
        let root = TempDir::new().unwrap();
        let cfg = StorageConfig {
            video_dir: root.path().join("nope"),
            results_dir: root.path().join("also-nope"),
            ..Default::default()
        };

        let report = cleanup(&cfg, false).unwrap();
        assert_eq!(report.files_scanned, 0);
        assert_eq!(report.files_deleted, 0);
    }
}
