//! The processing pipeline consumer.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch, Semaphore};
use tracing::{error, info, warn};

use camvault_models::ProcessingResult;

use crate::metrics;
use crate::processor::{persist_result, process_video, ProcessingContext};

/// Consumes queued videos and processes them under a concurrency bound.
///
/// Dispatch order is enqueue order; at most `max_concurrent_videos`
/// analyses run at once. A failed video is logged, persisted as a failed
/// result, and followed by a short backoff inside its task; it never
/// stops the loop.
pub struct Pipeline {
    ctx: Arc<ProcessingContext>,
    queue: mpsc::Receiver<PathBuf>,
    semaphore: Arc<Semaphore>,
    shutdown: watch::Receiver<bool>,
    error_backoff: Duration,
    max_concurrent: usize,
}

impl Pipeline {
    pub fn new(
        ctx: Arc<ProcessingContext>,
        queue: mpsc::Receiver<PathBuf>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let max_concurrent = ctx.config.max_concurrent_videos.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            error_backoff: ctx.config.error_backoff,
            max_concurrent,
            ctx,
            queue,
            shutdown,
        }
    }

    /// Run until shutdown, then drain the queue and wait for in-flight
    /// analyses to finish. Running analyses are never interrupted.
    pub async fn run(mut self) {
        info!(
            max_concurrent = self.max_concurrent,
            "Processing pipeline started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    if *self.shutdown.borrow() {
                        info!("Pipeline shutting down");
                        break;
                    }
                }
                next = self.queue.recv() => {
                    match next {
                        Some(path) => self.dispatch(path).await,
                        None => {
                            warn!("Video queue closed, stopping pipeline");
                            break;
                        }
                    }
                }
            }
        }

        // Videos already enqueued still get processed
        while let Ok(path) = self.queue.try_recv() {
            self.dispatch(path).await;
        }

        if let Ok(_all) = self.semaphore.acquire_many(self.max_concurrent as u32).await {
            info!("Pipeline stopped");
        }
    }

    async fn dispatch(&self, path: PathBuf) {
        let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return,
        };
        let ctx = Arc::clone(&self.ctx);
        let backoff = self.error_backoff;

        tokio::spawn(async move {
            let _permit = permit;
            let started = Instant::now();

            if let Err(e) = process_video(&ctx, &path).await {
                let elapsed = started.elapsed().as_secs_f64();
                error!(video = %path.display(), error = %e, "Video processing failed");
                metrics::record_video_processed("failed", elapsed);

                let result = ProcessingResult::failed(path.clone(), e.to_string(), elapsed);
                if let Err(e) = persist_result(&ctx.config.results_dir, &result) {
                    warn!(video = %path.display(), error = %e, "Failed to persist failure result");
                }

                tokio::time::sleep(backoff).await;
            }
        });
    }
}
