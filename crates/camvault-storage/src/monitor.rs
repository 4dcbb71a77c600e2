//! Background storage monitor.

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::cleanup::cleanup;
use crate::error::StorageResult;
use crate::stats::disk_usage;
use crate::StorageConfig;

/// Raised when disk usage crosses the cleanup threshold.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdAlert {
    pub percent_used: f64,
    pub threshold: f64,
}

/// Periodically checks disk usage for the video directory and forces a
/// cleanup when usage crosses the configured threshold.
///
/// A failed iteration logs and backs off for `error_backoff`; the loop
/// only terminates when the shutdown watch flips.
pub struct StorageMonitor {
    cfg: StorageConfig,
    alerts: mpsc::Sender<ThresholdAlert>,
    shutdown: watch::Receiver<bool>,
}

impl StorageMonitor {
    pub fn new(
        cfg: StorageConfig,
        alerts: mpsc::Sender<ThresholdAlert>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            cfg,
            alerts,
            shutdown,
        }
    }

    /// Run the monitor loop until shutdown.
    pub async fn run(mut self) {
        info!(
            interval_secs = self.cfg.monitor_interval.as_secs(),
            threshold_percent = self.cfg.cleanup_threshold_percent,
            "Storage monitor started"
        );

        loop {
            let sleep = match self.check_once().await {
                Ok(()) => self.cfg.monitor_interval,
                Err(e) => {
                    error!(error = %e, "Storage check failed, backing off");
                    self.cfg.error_backoff
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(sleep) => {}
                _ = self.shutdown.changed() => {
                    if *self.shutdown.borrow() {
                        info!("Storage monitor shutting down");
                        return;
                    }
                }
            }
        }
    }

    async fn check_once(&self) -> StorageResult<()> {
        if !self.cfg.video_dir.exists() {
            debug!(dir = %self.cfg.video_dir.display(), "Video directory absent, skipping check");
            return Ok(());
        }

        let usage = disk_usage(&self.cfg.video_dir)?;
        debug!(
            percent_used = usage.percent_used,
            free_bytes = usage.free_bytes,
            "Disk usage checked"
        );

        if usage.percent_used <= self.cfg.cleanup_threshold_percent {
            return Ok(());
        }

        warn!(
            percent_used = usage.percent_used,
            threshold = self.cfg.cleanup_threshold_percent,
            "Disk usage above threshold, running cleanup"
        );

        let report = cleanup(&self.cfg, false)?;
        info!(
            files_deleted = report.files_deleted,
            bytes_freed = report.bytes_freed,
            "Threshold cleanup finished"
        );

        let alert = ThresholdAlert {
            percent_used: usage.percent_used,
            threshold: self.cfg.cleanup_threshold_percent,
        };
        if self.alerts.send(alert).await.is_err() {
            debug!("Alert receiver dropped");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_monitor_emits_alert_above_threshold() {
        let root = TempDir::new().unwrap();
        let cfg = StorageConfig {
            video_dir: root.path().to_path_buf(),
            results_dir: root.path().join("results"),
            cleanup_threshold_percent: -1.0,
            monitor_interval: Duration::from_millis(10),
            ..Default::default()
        };

        let (alert_tx, mut alert_rx) = mpsc::channel(4);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(StorageMonitor::new(cfg, alert_tx, shutdown_rx).run());

        let alert = tokio::time::timeout(Duration::from_secs(2), alert_rx.recv())
            .await
            .expect("alert within timeout")
            .expect("alert present");
        assert!(alert.percent_used > alert.threshold);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_monitor_stays_quiet_below_threshold() {
        let root = TempDir::new().unwrap();
        let cfg = StorageConfig {
            video_dir: root.path().to_path_buf(),
            results_dir: root.path().join("results"),
            cleanup_threshold_percent: 100.0,
            monitor_interval: Duration::from_millis(10),
            ..Default::default()
        };

        let (alert_tx, mut alert_rx) = mpsc::channel(4);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(StorageMonitor::new(cfg, alert_tx, shutdown_rx).run());

        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        assert!(alert_rx.try_recv().is_err());
    }
}
