//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use camvault_faces::MultiFacePolicy;
use camvault_storage::StorageConfig;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory watched for incoming videos
    pub video_dir: PathBuf,
    /// Directory where per-video result files are written
    pub results_dir: PathBuf,
    /// Path of the persisted known-face gallery
    pub gallery_path: PathBuf,
    /// Directory of enrollment images scanned at startup; identity
    /// names come from file stems
    pub enroll_dir: PathBuf,
    /// Face detection model (ONNX)
    pub detect_model_path: PathBuf,
    /// Face embedding model (ONNX)
    pub embed_model_path: PathBuf,
    /// Analyze every Nth frame
    pub frame_skip: u32,
    /// How often the watcher polls the video directory
    pub watch_interval: Duration,
    /// A file is considered complete once its size is stable across
    /// polls and its mtime is at least this old
    pub stability_window: Duration,
    /// Maximum paths remembered by the watcher before oldest entries
    /// are evicted
    pub seen_capacity: usize,
    /// Maximum videos processed in parallel
    pub max_concurrent_videos: usize,
    /// Queue depth between the watcher and the pipeline
    pub queue_capacity: usize,
    /// Euclidean distance tolerance for gallery matching
    pub match_tolerance: f32,
    /// Confidence threshold assigned to newly enrolled faces
    pub default_confidence_threshold: f32,
    /// Policy for enrollment images with more than one face
    pub multi_face_policy: MultiFacePolicy,
    /// Files older than this many days are eligible for cleanup
    pub retention_days: u32,
    /// Disk usage percentage above which the monitor forces a cleanup
    pub cleanup_threshold_percent: f64,
    /// How often the storage monitor re-checks disk usage
    pub storage_monitor_interval: Duration,
    /// Sleep after a failed video or monitor iteration
    pub error_backoff: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            video_dir: PathBuf::from("videos"),
            results_dir: PathBuf::from("results"),
            gallery_path: PathBuf::from("gallery/known_faces.json"),
            enroll_dir: PathBuf::from("known_faces"),
            detect_model_path: PathBuf::from("models/version-slim-320.onnx"),
            embed_model_path: PathBuf::from("models/w600k_mbf.onnx"),
            frame_skip: 15,
            watch_interval: Duration::from_secs(5),
            stability_window: Duration::from_secs(10),
            seen_capacity: 1000,
            max_concurrent_videos: 2,
            queue_capacity: 64,
            match_tolerance: 0.6,
            default_confidence_threshold: 0.6,
            multi_face_policy: MultiFacePolicy::UseFirst,
            retention_days: 30,
            cleanup_threshold_percent: 90.0,
            storage_monitor_interval: Duration::from_secs(3600),
            error_backoff: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Create config from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            video_dir: path_var("CAMVAULT_VIDEO_DIR", defaults.video_dir),
            results_dir: path_var("CAMVAULT_RESULTS_DIR", defaults.results_dir),
            gallery_path: path_var("CAMVAULT_GALLERY_PATH", defaults.gallery_path),
            enroll_dir: path_var("CAMVAULT_ENROLL_DIR", defaults.enroll_dir),
            detect_model_path: path_var("CAMVAULT_DETECT_MODEL", defaults.detect_model_path),
            embed_model_path: path_var("CAMVAULT_EMBED_MODEL", defaults.embed_model_path),
            frame_skip: parse_var("CAMVAULT_FRAME_SKIP", defaults.frame_skip),
            watch_interval: Duration::from_secs(parse_var(
                "CAMVAULT_WATCH_INTERVAL_SECS",
                defaults.watch_interval.as_secs(),
            )),
            stability_window: Duration::from_secs(parse_var(
                "CAMVAULT_STABILITY_SECS",
                defaults.stability_window.as_secs(),
            )),
            seen_capacity: parse_var("CAMVAULT_SEEN_CAPACITY", defaults.seen_capacity),
            max_concurrent_videos: parse_var(
                "CAMVAULT_MAX_CONCURRENT",
                defaults.max_concurrent_videos,
            ),
            queue_capacity: parse_var("CAMVAULT_QUEUE_CAPACITY", defaults.queue_capacity),
            match_tolerance: parse_var("CAMVAULT_MATCH_TOLERANCE", defaults.match_tolerance),
            default_confidence_threshold: parse_var(
                "CAMVAULT_CONFIDENCE_THRESHOLD",
                defaults.default_confidence_threshold,
            ),
            multi_face_policy: parse_var(
                "CAMVAULT_MULTI_FACE_POLICY",
                defaults.multi_face_policy,
            ),
            retention_days: parse_var("CAMVAULT_RETENTION_DAYS", defaults.retention_days),
            cleanup_threshold_percent: parse_var(
                "CAMVAULT_CLEANUP_THRESHOLD",
                defaults.cleanup_threshold_percent,
            ),
            storage_monitor_interval: Duration::from_secs(parse_var(
                "CAMVAULT_MONITOR_INTERVAL_SECS",
                defaults.storage_monitor_interval.as_secs(),
            )),
            error_backoff: Duration::from_secs(parse_var(
                "CAMVAULT_ERROR_BACKOFF_SECS",
                defaults.error_backoff.as_secs(),
            )),
        }
    }

    /// The storage-crate view of this configuration.
    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig {
            video_dir: self.video_dir.clone(),
            results_dir: self.results_dir.clone(),
            retention_days: self.retention_days,
            cleanup_threshold_percent: self.cleanup_threshold_percent,
            monitor_interval: self.storage_monitor_interval,
            // Monitor failures back off for twice the interval, not the
            // short per-video backoff
            error_backoff: self.storage_monitor_interval * 2,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn path_var(name: &str, default: PathBuf) -> PathBuf {
    std::env::var(name).map(PathBuf::from).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.frame_skip, 15);
        assert_eq!(config.max_concurrent_videos, 2);
        assert_eq!(config.retention_days, 30);
        assert_eq!(config.multi_face_policy, MultiFacePolicy::UseFirst);
        assert!((config.match_tolerance - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn test_from_env_parse_or_default() {
        std::env::set_var("CAMVAULT_FRAME_SKIP", "30");
        std::env::set_var("CAMVAULT_MAX_CONCURRENT", "not-a-number");
        std::env::set_var("CAMVAULT_MULTI_FACE_POLICY", "reject");

        let config = Config::from_env();
        assert_eq!(config.frame_skip, 30);
        // Unparseable falls back to the default
        assert_eq!(config.max_concurrent_videos, 2);
        assert_eq!(config.multi_face_policy, MultiFacePolicy::Reject);

        std::env::remove_var("CAMVAULT_FRAME_SKIP");
        std::env::remove_var("CAMVAULT_MAX_CONCURRENT");
        std::env::remove_var("CAMVAULT_MULTI_FACE_POLICY");
    }

    #[test]
    fn test_storage_config_projection() {
        let config = Config {
            retention_days: 7,
            cleanup_threshold_percent: 80.0,
            ..Default::default()
        };
        let storage = config.storage_config();
        assert_eq!(storage.retention_days, 7);
        assert!((storage.cleanup_threshold_percent - 80.0).abs() < f64::EPSILON);
        assert_eq!(storage.video_dir, config.video_dir);
        // Monitor errors back off longer than the regular interval
        assert_eq!(storage.error_backoff, storage.monitor_interval * 2);
    }
}
