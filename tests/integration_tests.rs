//! Integration tests for the gather-herald bot
//!
//! These tests drive the full tick pipeline with mock collaborators:
//! - multi-tick notification scenarios across snapshot sequences
//! - fetch-failure recovery without state corruption
//! - maintenance edge announcements alongside the gather poll
//! - command-driven registration feeding the next tick

mod fixtures;

use fixtures::{lobby, registration};
use gather_herald::chat::client::{ChatMessage, MockChatClient};
use gather_herald::chat::commands::CommandRouter;
use gather_herald::gather::watcher::GatherWatcher;
use gather_herald::maintenance::{MaintenanceWatcher, MAINTENANCE_COMPLETE};
use gather_herald::metrics::MetricsCollector;
use gather_herald::registry::{InMemoryRegistryStore, RegistryStore};
use gather_herald::upstream::api::MockGatherApi;
use gather_herald::upstream::maps::StaticMapNames;
use gather_herald::HeraldError;
use std::sync::Arc;

const LINK_BASE: &str = "https://www.esportal.com/sv/gather";

struct TestSystem {
    api: Arc<MockGatherApi>,
    chat: Arc<MockChatClient>,
    registry: Arc<InMemoryRegistryStore>,
    watcher: GatherWatcher,
}

fn create_test_system(
    registrations: Vec<gather_herald::types::RegistryEntry>,
    channels: &[&str],
) -> TestSystem {
    let api = Arc::new(MockGatherApi::new());
    let chat = Arc::new(MockChatClient::with_channels(channels));
    let registry = Arc::new(InMemoryRegistryStore::with_entries(registrations));

    let watcher = GatherWatcher::new(
        api.clone(),
        registry.clone(),
        chat.clone(),
        Arc::new(StaticMapNames::new([(3, "de_mirage"), (7, "de_dust2")])),
        Arc::new(MetricsCollector::new().unwrap()),
        LINK_BASE.to_string(),
    );

    TestSystem {
        api,
        chat,
        registry,
        watcher,
    }
}

#[tokio::test]
async fn test_lobby_growth_notifies_only_the_new_player() {
    // Streamer A sits in lobby 1 from the start; streamer B joins later.
    let mut system = create_test_system(
        vec![
            registration("1", "streamer_a", 10, "StreamerA"),
            registration("2", "streamer_b", 11, "StreamerB"),
        ],
        &["streamer_a", "streamer_b"],
    );

    system.api.push_list(Ok(vec![lobby(1, 10, vec![10], 0)]));
    system.api.push_list(Ok(vec![lobby(1, 10, vec![10, 11], 0)]));

    system.watcher.tick().await.unwrap();
    system.watcher.tick().await.unwrap();

    let sent = system.chat.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "streamer_b");
    assert!(sent[0].1.contains("StreamerB joined creator10's gather lobby"));
}

#[tokio::test]
async fn test_new_lobby_notifies_its_creator() {
    let mut system = create_test_system(
        vec![registration("1", "streamer_a", 10, "StreamerA")],
        &["streamer_a"],
    );

    system.api.push_list(Ok(vec![]));
    system.api.push_list(Ok(vec![lobby(5, 10, vec![10], 0)]));

    system.watcher.tick().await.unwrap();
    system.watcher.tick().await.unwrap();

    let sent = system.chat.sent_messages();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("StreamerA started a gather lobby"));
    assert!(sent[0].1.contains("de_mirage"));
}

#[tokio::test]
async fn test_quiet_ticks_send_nothing() {
    let mut system = create_test_system(
        vec![registration("1", "streamer_a", 10, "StreamerA")],
        &["streamer_a"],
    );

    let snapshot = vec![lobby(1, 10, vec![10, 12], 1)];
    for _ in 0..4 {
        system.api.push_list(Ok(snapshot.clone()));
    }
    for _ in 0..4 {
        system.watcher.tick().await.unwrap();
    }

    assert!(system.chat.sent_messages().is_empty());
}

#[tokio::test]
async fn test_failed_tick_preserves_diff_baseline() {
    let mut system = create_test_system(
        vec![registration("1", "streamer_a", 11, "StreamerA")],
        &["streamer_a"],
    );

    system.api.push_list(Ok(vec![lobby(1, 10, vec![10], 0)]));
    system.api.push_list(Err(HeraldError::FetchFailed {
        message: "upstream 503".to_string(),
    }
    .into()));
    system.api.push_list(Ok(vec![lobby(1, 10, vec![10, 11], 0)]));

    system.watcher.tick().await.unwrap();
    assert!(system.watcher.tick().await.is_err());
    system.watcher.tick().await.unwrap();

    // The join that happened across the failed tick still gets announced.
    let sent = system.chat.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "streamer_a");
}

#[tokio::test]
async fn test_unregistered_and_disconnected_players_stay_silent() {
    // Player 50 is unregistered; streamer_b is registered but not connected.
    let mut system = create_test_system(
        vec![registration("2", "streamer_b", 60, "StreamerB")],
        &["somebody_else"],
    );

    system.api.push_list(Ok(vec![]));
    system.api.push_list(Ok(vec![lobby(1, 50, vec![50, 60], 0)]));

    system.watcher.tick().await.unwrap();
    system.watcher.tick().await.unwrap();

    assert!(system.chat.sent_messages().is_empty());
}

#[tokio::test]
async fn test_maintenance_and_gather_polls_are_independent() {
    let api = Arc::new(MockGatherApi::new());
    let chat = Arc::new(MockChatClient::with_channels(&["streamer_a"]));
    let metrics = Arc::new(MetricsCollector::new().unwrap());
    let mut maintenance = MaintenanceWatcher::new(api.clone(), chat.clone(), metrics);

    api.push_maintenance(Ok(None));
    api.push_maintenance(Ok(Some("Down for patch".to_string())));
    api.push_maintenance(Ok(None));

    maintenance.tick().await.unwrap();
    maintenance.tick().await.unwrap();
    maintenance.tick().await.unwrap();

    let sent = chat.sent_messages();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].1, "Maintenance: Down for patch");
    assert_eq!(sent[1].1, MAINTENANCE_COMPLETE);
}

#[tokio::test]
async fn test_chat_registration_feeds_the_next_tick() {
    // Start with an empty registry; a moderator registers mid-run.
    let mut system = create_test_system(vec![], &["streamer_a"]);

    let router = CommandRouter::new(system.registry.clone(), system.chat.clone(), '!');
    router
        .handle(&ChatMessage {
            channel: "streamer_a".to_string(),
            room_id: "42".to_string(),
            sender_login: "streamer_a".to_string(),
            sender_display: "StreamerA".to_string(),
            sender_is_mod: true,
            text: "!register StreamerA 10".to_string(),
        })
        .await;

    assert_eq!(system.registry.load().await.unwrap().len(), 1);

    system.api.push_list(Ok(vec![]));
    system.api.push_list(Ok(vec![lobby(1, 10, vec![10], 0)]));

    system.watcher.tick().await.unwrap();
    system.watcher.tick().await.unwrap();

    let sent = system.chat.sent_messages();
    // First message is the registration reply, second the notification.
    assert_eq!(sent.len(), 2);
    assert!(sent[0].1.contains("Bot registered on channel: streamer_a"));
    assert!(sent[1].1.contains("StreamerA started a gather lobby"));
}

#[tokio::test]
async fn test_picked_count_renders_against_capacity_of_ten() {
    let mut system = create_test_system(
        vec![registration("1", "streamer_a", 10, "StreamerA")],
        &["streamer_a"],
    );

    system.api.push_list(Ok(vec![]));
    system
        .api
        .push_list(Ok(vec![lobby(9, 10, vec![10, 20, 30, 40], 3)]));

    system.watcher.tick().await.unwrap();
    system.watcher.tick().await.unwrap();

    let sent = system.chat.sent_messages();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("Waiting: 1"));
    assert!(sent[0].1.contains("Picked: 3/10"));
}
