//! Health check endpoints and Prometheus metrics server
//!
//! Serves `/healthz` and `/metrics` over HTTP using Axum so the bot can run
//! under the usual container probes and scrapers.

use crate::metrics::collector::MetricsCollector;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Health server configuration
#[derive(Debug, Clone)]
pub struct HealthServerConfig {
    /// Port to bind the health server to
    pub port: u16,
    /// Host to bind to (typically "0.0.0.0" for all interfaces)
    pub host: String,
}

impl Default for HealthServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

/// Health server that provides HTTP endpoints for monitoring
pub struct HealthServer {
    config: HealthServerConfig,
    metrics_collector: Arc<MetricsCollector>,
    shutdown_tx: broadcast::Sender<()>,
}

impl HealthServer {
    /// Create a new health server
    pub fn new(config: HealthServerConfig, metrics_collector: Arc<MetricsCollector>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            metrics_collector,
            shutdown_tx,
        }
    }

    /// Start the health server; resolves when shut down.
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("Invalid health server address")?;

        let app = Router::new()
            .route("/healthz", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(self.metrics_collector.clone());

        let listener = TcpListener::bind(addr).await?;
        info!("Health server listening on http://{}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("Health server shutdown signal received");
            })
            .await?;

        info!("Health server stopped");
        Ok(())
    }

    /// Stop the health server
    pub fn stop(&self) {
        if self.shutdown_tx.send(()).is_err() {
            warn!("Health server was not running");
        }
    }
}

async fn health_handler(State(collector): State<Arc<MetricsCollector>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "connected_channels": collector.connected_channels.get(),
        "notifications_sent": collector.notifications_sent_total.get(),
    }))
}

async fn metrics_handler(State(collector): State<Arc<MetricsCollector>>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let families = collector.registry().gather();
    let mut buffer = Vec::new();

    match encoder.encode(&families, &mut buffer) {
        Ok(()) => (StatusCode::OK, buffer).into_response(),
        Err(e) => {
            warn!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "encoding failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_server_config_default() {
        let config = HealthServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[tokio::test]
    async fn test_stop_before_start_is_harmless() {
        let collector = Arc::new(MetricsCollector::new().unwrap());
        let server = HealthServer::new(HealthServerConfig::default(), collector);
        server.stop();
    }
}
