//! Maintenance flag watcher
//!
//! Tracks a per-channel boolean state machine over the upstream maintenance
//! banner and announces edge transitions. A tick that cannot observe the
//! flag leaves every channel's state untouched.

use crate::chat::client::ChatClient;
use crate::error::Result;
use crate::metrics::MetricsCollector;
use crate::types::RenderedMessage;
use crate::upstream::api::GatherApi;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Sent when the maintenance banner disappears again
pub const MAINTENANCE_COMPLETE: &str =
    "Maintenance is now complete, You should now be able to play again!";

/// Polls the maintenance flag and announces start/end per channel
pub struct MaintenanceWatcher {
    api: Arc<dyn GatherApi>,
    chat: Arc<dyn ChatClient>,
    metrics: Arc<MetricsCollector>,
    /// Channel -> currently under maintenance. Absent means `false`.
    states: HashMap<String, bool>,
}

impl MaintenanceWatcher {
    pub fn new(
        api: Arc<dyn GatherApi>,
        chat: Arc<dyn ChatClient>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            api,
            chat,
            metrics,
            states: HashMap::new(),
        }
    }

    /// Run one poll cycle. Fetch errors skip the tick silently.
    pub async fn tick(&mut self) -> Result<()> {
        let banner = match self.api.fetch_maintenance().await {
            Ok(banner) => banner,
            Err(e) => {
                self.metrics.record_fetch_failure("maintenance");
                debug!("Maintenance fetch failed, keeping state: {}", e);
                return Ok(());
            }
        };

        let connected = self.chat.connected_channels().await;
        for message in self.observe(banner.as_deref(), &connected) {
            if let Err(e) = self.chat.say(&message.channel, &message.text).await {
                self.metrics.send_failures_total.inc();
                warn!("Send to {} failed: {}", message.channel, e);
            }
        }

        Ok(())
    }

    /// Apply one observation of the maintenance flag to every connected
    /// channel, returning the edge-transition announcements.
    pub fn observe(
        &mut self,
        banner: Option<&str>,
        connected: &HashSet<String>,
    ) -> Vec<RenderedMessage> {
        let mut messages = Vec::new();

        for channel in connected {
            let state = self.states.entry(channel.clone()).or_insert(false);
            match (banner, *state) {
                (Some(text), false) => {
                    *state = true;
                    self.metrics.record_maintenance_transition("started");
                    info!("Maintenance started, announcing in {}", channel);
                    messages.push(RenderedMessage {
                        channel: channel.clone(),
                        text: format!("Maintenance: {}", text),
                    });
                }
                (None, true) => {
                    *state = false;
                    self.metrics.record_maintenance_transition("completed");
                    info!("Maintenance completed, announcing in {}", channel);
                    messages.push(RenderedMessage {
                        channel: channel.clone(),
                        text: MAINTENANCE_COMPLETE.to_string(),
                    });
                }
                _ => {}
            }
        }

        messages
    }
}
