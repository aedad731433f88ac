use anyhow::Result;
use nfsclient::*;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tikv_jemallocator::Jemalloc;
use tokio::sync::{broadcast, watch};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    // Bad mount patterns fail here, before any scan runs.
    let client = Arc::new(nfs::NfsClient::new(&app_config.nfsclient)?);
    tracing::info!(
        path = %client.path().display(),
        fullstat = client.fullstat(),
        nfs3_operations = client.operations().nfs3_len(),
        nfs4_operations = client.operations().nfs4_len(),
        "nfsclient collector configured"
    );

    let (tx, _) = broadcast::channel::<models::MetricsSnapshot>(
        app_config.collector.broadcast_capacity,
    );
    let (latest_tx, latest_rx) = watch::channel(None);
    let ws_metrics_connections = Arc::new(AtomicUsize::new(0));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            client,
            tx: tx.clone(),
            latest_tx,
            ws_metrics_connections: ws_metrics_connections.clone(),
            shutdown_rx,
        },
        worker::WorkerConfig {
            interval_ms: app_config.collector.interval_ms,
            stats_log_interval_secs: app_config.collector.stats_log_interval_secs,
        },
    );

    let app = routes::app(tx, latest_rx, ws_metrics_connections);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(_) => {
                        let _ = tokio::signal::ctrl_c().await;
                        return;
                    }
                };
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            #[cfg(not(unix))]
            {
                let _ = tokio::signal::ctrl_c().await;
            }
        } => {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
            let _ = worker_handle.await;
        }
    }

    Ok(())
}
