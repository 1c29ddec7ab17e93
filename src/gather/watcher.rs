//! The gather poll tick
//!
//! Owns the previous-snapshot cell and drives one full cycle per call. The
//! snapshot is replaced wholesale only after every notification for the tick
//! was attempted; an aborted tick leaves it untouched so the next comparison
//! still runs against a coherent snapshot.

use crate::chat::client::ChatClient;
use crate::error::Result;
use crate::gather::correlator::{correlate, resolve_candidates};
use crate::gather::detector::detect_changes;
use crate::gather::notifier::render;
use crate::metrics::MetricsCollector;
use crate::registry::{RegistryLookup, RegistryStore};
use crate::types::GatherList;
use crate::upstream::api::GatherApi;
use crate::upstream::maps::MapNameResolver;
use std::sync::Arc;
use tracing::{info, warn};

/// Polls the gather list and notifies registered, connected channels
pub struct GatherWatcher {
    api: Arc<dyn GatherApi>,
    registry: Arc<dyn RegistryStore>,
    chat: Arc<dyn ChatClient>,
    maps: Arc<dyn MapNameResolver>,
    metrics: Arc<MetricsCollector>,
    lobby_link_base: String,
    /// Snapshot from the immediately prior tick; single writer, this struct.
    previous: Option<GatherList>,
}

impl GatherWatcher {
    pub fn new(
        api: Arc<dyn GatherApi>,
        registry: Arc<dyn RegistryStore>,
        chat: Arc<dyn ChatClient>,
        maps: Arc<dyn MapNameResolver>,
        metrics: Arc<MetricsCollector>,
        lobby_link_base: String,
    ) -> Self {
        Self {
            api,
            registry,
            chat,
            maps,
            metrics,
            lobby_link_base,
            previous: None,
        }
    }

    /// Run one poll cycle.
    ///
    /// A registry or fetch failure aborts the tick with no state mutation;
    /// render and send failures only skip their candidate.
    pub async fn tick(&mut self) -> Result<()> {
        self.metrics.gather_polls_total.inc();

        let registry_map = match self.registry.load().await {
            Ok(map) => map,
            Err(e) => {
                self.metrics.record_fetch_failure("registry");
                return Err(e);
            }
        };

        let current = match self.api.fetch_gather_list().await {
            Ok(list) => list,
            Err(e) => {
                self.metrics.record_fetch_failure("gather");
                return Err(e);
            }
        };

        // Immutable for the rest of this tick.
        let connected = self.chat.connected_channels().await;
        self.metrics.connected_channels.set(connected.len() as i64);

        let changed = detect_changes(self.previous.as_ref(), &current);
        if !changed.is_empty() {
            let summary: Vec<String> = changed
                .iter()
                .map(|lobby| format!("{} ({})", lobby.name, lobby.players.len()))
                .collect();
            info!(
                "{} changed gathers: {}",
                changed.len(),
                summary.join(", ")
            );
            self.metrics.changed_lobbies_total.inc_by(changed.len() as u64);

            let lookup = RegistryLookup::new(&registry_map);
            let candidates = correlate(&changed, self.previous.as_ref(), &lookup, &connected);

            for (candidate, lobby) in resolve_candidates(candidates, &current) {
                let channel = candidate.entry.twitch.channel.clone();
                // A failed moderator check downgrades to the linkless format.
                let is_moderator = self.chat.is_moderator(&channel).await.unwrap_or(false);
                let map_name = self.maps.resolve(lobby.map_id).await;

                let message = match render(
                    &candidate,
                    lobby,
                    &map_name,
                    is_moderator,
                    &self.lobby_link_base,
                ) {
                    Ok(message) => message,
                    Err(e) => {
                        warn!("Skipping notification for {}: {}", channel, e);
                        continue;
                    }
                };

                match self.chat.say(&message.channel, &message.text).await {
                    Ok(()) => {
                        self.metrics.notifications_sent_total.inc();
                        info!("[{}] {}", message.channel, message.text);
                    }
                    Err(e) => {
                        self.metrics.send_failures_total.inc();
                        warn!("Send to {} failed: {}", message.channel, e);
                    }
                }
            }
        }

        self.previous = Some(current);
        Ok(())
    }

    /// The snapshot the next tick will diff against.
    pub fn previous_snapshot(&self) -> Option<&GatherList> {
        self.previous.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::client::MockChatClient;
    use crate::error::HeraldError;
    use crate::metrics::MetricsCollector;
    use crate::registry::InMemoryRegistryStore;
    use crate::types::{LinkedPlayer, Lobby, LobbyCreator, RegistryEntry, TwitchIdentity};
    use crate::upstream::api::MockGatherApi;
    use crate::upstream::maps::StaticMapNames;
    use crate::utils::current_timestamp;

    const LINK_BASE: &str = "https://www.esportal.com/sv/gather";

    fn lobby(id: u64, players: Vec<u64>, picked: u32) -> Lobby {
        Lobby {
            id,
            name: format!("lobby-{}", id),
            creator: LobbyCreator {
                id: players.first().copied().unwrap_or(0),
                username: "host".to_string(),
            },
            players,
            picked_players: picked,
            map_id: 3,
        }
    }

    fn entry(twitch_id: &str, channel: &str, player_id: u64, name: &str) -> RegistryEntry {
        RegistryEntry {
            twitch: TwitchIdentity {
                id: twitch_id.to_string(),
                login: channel.to_string(),
                channel: channel.to_string(),
                display_name: channel.to_string(),
            },
            player: LinkedPlayer {
                id: player_id,
                name: name.to_string(),
            },
            disabled_commands: Vec::new(),
            registered_at: current_timestamp(),
        }
    }

    struct Harness {
        api: Arc<MockGatherApi>,
        chat: Arc<MockChatClient>,
        watcher: GatherWatcher,
    }

    fn harness(entries: Vec<RegistryEntry>, channels: &[&str]) -> Harness {
        let api = Arc::new(MockGatherApi::new());
        let chat = Arc::new(MockChatClient::with_channels(channels));
        let watcher = GatherWatcher::new(
            api.clone(),
            Arc::new(InMemoryRegistryStore::with_entries(entries)),
            chat.clone(),
            Arc::new(StaticMapNames::new([(3, "de_mirage")])),
            Arc::new(MetricsCollector::new().unwrap()),
            LINK_BASE.to_string(),
        );
        Harness { api, chat, watcher }
    }

    #[tokio::test]
    async fn test_first_tick_only_seeds_snapshot() {
        let mut h = harness(
            vec![entry("1", "streamer_x", 10, "StreamerX")],
            &["streamer_x"],
        );
        h.api.push_list(Ok(vec![lobby(1, vec![10], 0)]));

        h.watcher.tick().await.unwrap();

        assert!(h.chat.sent_messages().is_empty());
        assert!(h.watcher.previous_snapshot().is_some());
    }

    #[tokio::test]
    async fn test_joining_player_notifies_once() {
        // P1 waits in lobby 1, then the registered P2 joins and one of the
        // two players gets picked.
        let mut h = harness(
            vec![entry("1", "streamer_x", 2, "StreamerX")],
            &["streamer_x"],
        );
        h.api.push_list(Ok(vec![lobby(1, vec![1], 0)]));
        h.api.push_list(Ok(vec![lobby(1, vec![1, 2], 1)]));

        h.watcher.tick().await.unwrap();
        h.watcher.tick().await.unwrap();

        let sent = h.chat.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "streamer_x");
        assert!(sent[0].1.contains("StreamerX joined host's gather lobby"));
        assert!(sent[0].1.contains("Waiting: 1"));
        assert!(sent[0].1.contains("Picked: 1/10"));
    }

    #[tokio::test]
    async fn test_unchanged_roster_never_renotifies() {
        let mut h = harness(
            vec![entry("1", "streamer_x", 10, "StreamerX")],
            &["streamer_x"],
        );
        let snapshot = vec![lobby(1, vec![10], 0)];
        h.api.push_list(Ok(snapshot.clone()));
        h.api.push_list(Ok(snapshot.clone()));
        h.api.push_list(Ok(snapshot));

        for _ in 0..3 {
            h.watcher.tick().await.unwrap();
        }

        assert!(h.chat.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn test_moderator_channel_gets_deep_link() {
        let mut h = harness(
            vec![entry("1", "streamer_x", 10, "StreamerX")],
            &["streamer_x"],
        );
        h.chat.grant_moderator("streamer_x");
        h.api.push_list(Ok(vec![]));
        h.api.push_list(Ok(vec![lobby(1, vec![10], 0)]));

        h.watcher.tick().await.unwrap();
        h.watcher.tick().await.unwrap();

        let sent = h.chat.sent_messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0]
            .1
            .contains("https://www.esportal.com/sv/gather/1"));
        assert!(!sent[0].1.contains("lobby-1"));
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_tick_without_mutation() {
        let mut h = harness(
            vec![entry("1", "streamer_x", 11, "StreamerX")],
            &["streamer_x"],
        );
        h.api.push_list(Ok(vec![lobby(1, vec![10], 0)]));
        h.api.push_list(Err(HeraldError::FetchFailed {
            message: "503".to_string(),
        }
        .into()));
        // Roster grew relative to the snapshot from tick 1; the failed tick
        // in between must not have swallowed that diff.
        h.api.push_list(Ok(vec![lobby(1, vec![10, 11], 0)]));

        h.watcher.tick().await.unwrap();
        assert!(h.watcher.tick().await.is_err());
        h.watcher.tick().await.unwrap();

        assert_eq!(h.chat.sent_messages().len(), 1);
    }

    #[tokio::test]
    async fn test_disconnected_channel_is_skipped() {
        let mut h = harness(vec![entry("1", "streamer_x", 10, "StreamerX")], &[]);
        h.api.push_list(Ok(vec![]));
        h.api.push_list(Ok(vec![lobby(1, vec![10], 0)]));

        h.watcher.tick().await.unwrap();
        h.watcher.tick().await.unwrap();

        assert!(h.chat.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn test_overpicked_lobby_is_skipped_not_fatal() {
        let mut h = harness(
            vec![entry("1", "streamer_x", 10, "StreamerX")],
            &["streamer_x"],
        );
        h.api.push_list(Ok(vec![]));
        h.api.push_list(Ok(vec![lobby(1, vec![10], 9)]));

        h.watcher.tick().await.unwrap();
        h.watcher.tick().await.unwrap();

        assert!(h.chat.sent_messages().is_empty());
        // The tick still completed and replaced the snapshot.
        assert_eq!(h.watcher.previous_snapshot().unwrap().len(), 1);
    }
}
