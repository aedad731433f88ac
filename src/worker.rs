// Background collection worker.
// Each tick scans mountstats on a blocking thread and publishes the snapshot to
// /ws/metrics subscribers (broadcast) and to /metrics (latest value in a watch).

use crate::models::MetricsSnapshot;
use crate::nfs::NfsClient;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{broadcast, oneshot, watch};
use tokio::time::{Duration, Instant, interval};
use tracing::Instrument;

/// Rate limit for "no receivers" debug event (avoid logging every tick when no one is on /ws/metrics)
const NO_RECEIVERS_WARN_INTERVAL: Duration = Duration::from_secs(60);

/// Client, channels, and shutdown for the worker.
pub struct WorkerDeps {
    pub client: Arc<NfsClient>,
    pub tx: broadcast::Sender<MetricsSnapshot>,
    pub latest_tx: watch::Sender<Option<MetricsSnapshot>>,
    pub ws_metrics_connections: Arc<AtomicUsize>,
    pub shutdown_rx: oneshot::Receiver<()>,
}

/// Worker timing and logging config.
pub struct WorkerConfig {
    pub interval_ms: u64,
    /// How often to log collector stats (real seconds).
    pub stats_log_interval_secs: u64,
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                operation = "get_timestamp",
                "system time error"
            );
            0
        })
}

/// Runs one collection cycle off the async runtime (file I/O is blocking).
pub async fn collect_once(client: Arc<NfsClient>) -> anyhow::Result<MetricsSnapshot> {
    let metrics = tokio::task::spawn_blocking(move || client.collect())
        .await
        .map_err(|e| anyhow::anyhow!("mountstats task join: {}", e))??;
    Ok(MetricsSnapshot {
        timestamp: now_millis(),
        metrics,
    })
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        client,
        tx,
        latest_tx,
        ws_metrics_connections,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        interval_ms,
        stats_log_interval_secs,
    } = config;

    let stats_log_interval = Duration::from_secs(stats_log_interval_secs);

    let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", interval_ms);

    tokio::spawn(
        async move {
            let mut tick = interval(Duration::from_millis(interval_ms));
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut stats_log_tick = interval(stats_log_interval);
            stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            let mut cycles_ok: u64 = 0;
            let mut cycles_failed: u64 = 0;
            let mut last_metric_count: usize = 0;
            let mut last_no_receivers_warn: Option<Instant> = None;

            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        let snapshot = match collect_once(client.clone()).await {
                            Ok(s) => s,
                            Err(e) => {
                                cycles_failed += 1;
                                tracing::warn!(
                                    error = %e,
                                    operation = "gather",
                                    path = %client.path().display(),
                                    "mountstats collection failed"
                                );
                                continue;
                            }
                        };
                        cycles_ok += 1;
                        last_metric_count = snapshot.metrics.len();
                        tracing::debug!(
                            operation = "gather",
                            metrics_count = last_metric_count,
                            "mountstats collected"
                        );

                        latest_tx.send_replace(Some(snapshot.clone()));
                        if tx.send(snapshot).is_err() {
                            let should_warn = last_no_receivers_warn
                                .is_none_or(|t| t.elapsed() >= NO_RECEIVERS_WARN_INTERVAL);
                            if should_warn {
                                tracing::debug!(
                                    operation = "broadcast_snapshot",
                                    "No active WebSocket clients; broadcast channel has no receivers"
                                );
                                last_no_receivers_warn = Some(Instant::now());
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Worker shutting down");
                        break;
                    }
                    _ = stats_log_tick.tick() => {
                        tracing::info!(
                            ws_metrics_clients = ws_metrics_connections.load(Ordering::Relaxed),
                            cycles_ok,
                            cycles_failed,
                            last_metric_count,
                            "collector stats"
                        );
                    }
                }
            }
        }
        .instrument(worker_span),
    )
}
