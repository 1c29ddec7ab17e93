//! Common types used throughout the gather notification bot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for gather-service players
pub type PlayerId = u64;

/// Unique identifier for gather lobbies, assigned upstream
pub type LobbyId = u64;

/// Unique identifier for maps on the gather service
pub type MapId = u32;

/// Twitch user id as delivered by IRC tags (numeric, but carried as text)
pub type TwitchUserId = String;

/// Creator of a gather lobby as reported by the upstream list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyCreator {
    pub id: PlayerId,
    pub username: String,
}

/// One forming lobby from the upstream gather list.
///
/// `players` is kept in upstream order; roster comparison between polls is
/// positional, so the order is load-bearing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lobby {
    pub id: LobbyId,
    pub name: String,
    pub creator: LobbyCreator,
    #[serde(default)]
    pub players: Vec<PlayerId>,
    #[serde(default)]
    pub picked_players: u32,
    pub map_id: MapId,
}

impl Lobby {
    /// Players still waiting to be picked onto a team.
    pub fn waiting(&self) -> usize {
        self.players.len().saturating_sub(self.picked_players as usize)
    }
}

/// One fetched point-in-time list of all active lobbies
pub type GatherList = Vec<Lobby>;

/// Find a lobby by id within a snapshot.
pub fn find_lobby(list: &GatherList, id: LobbyId) -> Option<&Lobby> {
    list.iter().find(|lobby| lobby.id == id)
}

/// Twitch-side identity of a registered channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitchIdentity {
    /// Twitch user id of the broadcaster
    pub id: TwitchUserId,
    /// Lowercase login name
    pub login: String,
    /// Channel the bot joins and notifies (same as login, no `#`)
    pub channel: String,
    /// Display name for replies
    pub display_name: String,
}

/// Gather-service identity linked to a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedPlayer {
    pub id: PlayerId,
    pub name: String,
}

/// One persisted registration: a streaming channel tied to a service player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub twitch: TwitchIdentity,
    pub player: LinkedPlayer,
    /// Command names disabled in this channel
    #[serde(default)]
    pub disabled_commands: Vec<String>,
    pub registered_at: DateTime<Utc>,
}

/// A provisional notification pending re-resolution against the current snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationCandidate {
    pub entry: RegistryEntry,
    pub lobby_id: LobbyId,
}

/// A formatted chat line bound to its target channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub channel: String,
    pub text: String,
}
