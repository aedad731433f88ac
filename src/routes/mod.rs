// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{broadcast, watch};
use tower_http::cors::{Any, CorsLayer};

use crate::models::MetricsSnapshot;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) stats_tx: broadcast::Sender<MetricsSnapshot>,
    pub(crate) latest_rx: watch::Receiver<Option<MetricsSnapshot>>,
    pub(crate) ws_metrics_connections: Arc<AtomicUsize>,
}

pub fn app(
    stats_tx: broadcast::Sender<MetricsSnapshot>,
    latest_rx: watch::Receiver<Option<MetricsSnapshot>>,
    ws_metrics_connections: Arc<AtomicUsize>,
) -> Router {
    let state = AppState {
        stats_tx,
        latest_rx,
        ws_metrics_connections,
    };
    Router::new()
        .route("/", get(|| async { "nfsclient: NFS mountstats collector" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/metrics", get(http::metrics_handler)) // GET /metrics
        .route("/ws/metrics", get(ws::ws_metrics)) // WS /ws/metrics
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
