//! Camera video ingestion worker binary.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use camvault_storage::StorageMonitor;
use camvault_worker::{
    metrics, Config, DirectoryWatcher, Event, EventSink, LogSink, Pipeline, ProcessingContext,
};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("camvault=info".parse().unwrap())
        .add_directive("ort=warn".parse().unwrap())
        .add_directive("onnxruntime=warn".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting camvault-worker");

    if let Err(e) = metrics::install_exporter() {
        error!("Failed to start metrics exporter: {}", e);
        std::process::exit(1);
    }

    let config = Config::from_env();
    info!("Worker config: {:?}", config);

    let events: Arc<dyn EventSink> = Arc::new(LogSink);

    let ctx = match ProcessingContext::new(config.clone(), Arc::clone(&events)) {
        Ok(ctx) => Arc::new(ctx),
        Err(e) => {
            error!("Failed to initialize processing context: {}", e);
            std::process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (video_tx, video_rx) = mpsc::channel(config.queue_capacity);
    let (alert_tx, mut alert_rx) = mpsc::channel(8);

    let watcher = DirectoryWatcher::new(&config, video_tx, shutdown_rx.clone());
    let watcher_task = tokio::spawn(watcher.run());

    let pipeline = Pipeline::new(Arc::clone(&ctx), video_rx, shutdown_rx.clone());
    let pipeline_task = tokio::spawn(pipeline.run());

    let monitor = StorageMonitor::new(config.storage_config(), alert_tx, shutdown_rx);
    let monitor_task = tokio::spawn(monitor.run());

    // Bridge storage alerts into the event sink
    let alert_events = Arc::clone(&events);
    let alert_task = tokio::spawn(async move {
        while let Some(alert) = alert_rx.recv().await {
            alert_events.publish(&Event::StorageThresholdExceeded {
                percent_used: alert.percent_used,
                threshold: alert.threshold,
            });
        }
    });

    tokio::signal::ctrl_c().await.ok();
    info!("Received shutdown signal");

    shutdown_tx.send(true).ok();

    watcher_task.await.ok();
    pipeline_task.await.ok();
    monitor_task.await.ok();
    alert_task.abort();

    info!("Worker shutdown complete");
}
