//! Directory watcher for incoming videos.
//!
//! Polls the video directory and enqueues each new video exactly once
//! per process lifetime (within the seen-set capacity). A file is only
//! considered complete once its size has stopped changing between polls
//! and its mtime has aged past the stability window, so half-written
//! uploads are never enqueued.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::WorkerResult;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv"];

/// Bounded set of already-enqueued paths with oldest-first eviction.
///
/// Eviction means a very old path could in principle be re-enqueued;
/// with a sane capacity that only happens long after its file has been
/// cleaned up.
#[derive(Debug)]
pub(crate) struct SeenSet {
    order: VecDeque<PathBuf>,
    members: HashSet<PathBuf>,
    capacity: usize,
}

impl SeenSet {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity.min(1024)),
            members: HashSet::new(),
            capacity: capacity.max(1),
        }
    }

    pub(crate) fn contains(&self, path: &Path) -> bool {
        self.members.contains(path)
    }

    pub(crate) fn insert(&mut self, path: PathBuf) {
        if !self.members.insert(path.clone()) {
            return;
        }
        self.order.push_back(path);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.members.remove(&evicted);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }
}

/// Last observed size and mtime for a not-yet-stable file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    size: u64,
    modified: SystemTime,
}

/// Watches the video directory and feeds the processing queue.
pub struct DirectoryWatcher {
    video_dir: PathBuf,
    watch_interval: Duration,
    stability_window: Duration,
    seen: SeenSet,
    pending: HashMap<PathBuf, Snapshot>,
    queue: mpsc::Sender<PathBuf>,
    shutdown: watch::Receiver<bool>,
}

impl DirectoryWatcher {
    pub fn new(
        config: &Config,
        queue: mpsc::Sender<PathBuf>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            video_dir: config.video_dir.clone(),
            watch_interval: config.watch_interval,
            stability_window: config.stability_window,
            seen: SeenSet::new(config.seen_capacity),
            pending: HashMap::new(),
            queue,
            shutdown,
        }
    }

    /// Run the watch loop until shutdown.
    pub async fn run(mut self) {
        info!(
            dir = %self.video_dir.display(),
            interval_secs = self.watch_interval.as_secs(),
            "Directory watcher started"
        );

        loop {
            if let Err(e) = self.scan_once().await {
                warn!(error = %e, "Directory scan failed");
            }

            tokio::select! {
                _ = tokio::time::sleep(self.watch_interval) => {}
                _ = self.shutdown.changed() => {
                    if *self.shutdown.borrow() {
                        info!("Directory watcher shutting down");
                        return;
                    }
                }
            }
        }
    }

    /// One poll of the directory. Returns how many videos were enqueued.
    pub(crate) async fn scan_once(&mut self) -> WorkerResult<usize> {
        if !self.video_dir.is_dir() {
            debug!(dir = %self.video_dir.display(), "Video directory absent");
            self.pending.clear();
            return Ok(0);
        }

        let mut listed = HashSet::new();
        let mut enqueued = 0usize;

        for entry in std::fs::read_dir(&self.video_dir)? {
            let entry = entry?;
            let path = entry.path();

            if !is_video(&path) || self.seen.contains(&path) {
                continue;
            }

            let meta = match entry.metadata() {
                Ok(meta) => meta,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to stat candidate");
                    continue;
                }
            };
            let modified = match meta.modified() {
                Ok(modified) => modified,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "No mtime for candidate");
                    continue;
                }
            };
            let snapshot = Snapshot {
                size: meta.len(),
                modified,
            };
            listed.insert(path.clone());

            let stable = self.pending.get(&path) == Some(&snapshot) && self.aged(modified);
            if !stable {
                self.pending.insert(path, snapshot);
                continue;
            }

            if self.queue.send(path.clone()).await.is_err() {
                warn!("Processing queue closed, stopping scan");
                return Ok(enqueued);
            }

            info!(path = %path.display(), "Video enqueued");
            self.pending.remove(&path);
            self.seen.insert(path);
            enqueued += 1;
        }

        // Files that vanished before stabilizing
        self.pending.retain(|path, _| listed.contains(path));

        Ok(enqueued)
    }

    fn aged(&self, modified: SystemTime) -> bool {
        SystemTime::now()
            .duration_since(modified)
            .map(|age| age >= self.stability_window)
            .unwrap_or(false)
    }
}

fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            VIDEO_EXTENSIONS.iter().any(|v| *v == ext)
        })
        .unwrap_or(false)
}
