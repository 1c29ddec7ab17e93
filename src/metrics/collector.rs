//! Metrics collection using Prometheus

use anyhow::Result;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;

/// Main metrics collector for the bot
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Total gather poll cycles started
    pub gather_polls_total: IntCounter,

    /// Upstream fetch failures by source (gather, maintenance, registry)
    pub fetch_failures_total: IntCounterVec,

    /// Lobbies reported changed by the detector
    pub changed_lobbies_total: IntCounter,

    /// Notifications delivered to chat
    pub notifications_sent_total: IntCounter,

    /// Chat sends that failed
    pub send_failures_total: IntCounter,

    /// Maintenance edge transitions by direction (started, completed)
    pub maintenance_transitions_total: IntCounterVec,

    /// Channels the bot currently holds a session in
    pub connected_channels: IntGauge,
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());

        let gather_polls_total = IntCounter::with_opts(Opts::new(
            "herald_gather_polls_total",
            "Total gather poll cycles started",
        ))?;
        let fetch_failures_total = IntCounterVec::new(
            Opts::new(
                "herald_fetch_failures_total",
                "Upstream fetch failures by source",
            ),
            &["source"],
        )?;
        let changed_lobbies_total = IntCounter::with_opts(Opts::new(
            "herald_changed_lobbies_total",
            "Lobbies reported changed by the detector",
        ))?;
        let notifications_sent_total = IntCounter::with_opts(Opts::new(
            "herald_notifications_sent_total",
            "Notifications delivered to chat",
        ))?;
        let send_failures_total = IntCounter::with_opts(Opts::new(
            "herald_send_failures_total",
            "Chat sends that failed",
        ))?;
        let maintenance_transitions_total = IntCounterVec::new(
            Opts::new(
                "herald_maintenance_transitions_total",
                "Maintenance edge transitions by direction",
            ),
            &["direction"],
        )?;
        let connected_channels = IntGauge::with_opts(Opts::new(
            "herald_connected_channels",
            "Channels the bot currently holds a session in",
        ))?;

        registry.register(Box::new(gather_polls_total.clone()))?;
        registry.register(Box::new(fetch_failures_total.clone()))?;
        registry.register(Box::new(changed_lobbies_total.clone()))?;
        registry.register(Box::new(notifications_sent_total.clone()))?;
        registry.register(Box::new(send_failures_total.clone()))?;
        registry.register(Box::new(maintenance_transitions_total.clone()))?;
        registry.register(Box::new(connected_channels.clone()))?;

        Ok(Self {
            registry,
            gather_polls_total,
            fetch_failures_total,
            changed_lobbies_total,
            notifications_sent_total,
            send_failures_total,
            maintenance_transitions_total,
            connected_channels,
        })
    }

    /// Get the underlying registry for the metrics endpoint
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Record one upstream fetch failure.
    pub fn record_fetch_failure(&self, source: &str) {
        self.fetch_failures_total.with_label_values(&[source]).inc();
    }

    /// Record one maintenance edge transition.
    pub fn record_maintenance_transition(&self, direction: &str) {
        self.maintenance_transitions_total
            .with_label_values(&[direction])
            .inc();
    }
}
