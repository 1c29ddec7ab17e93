//! Shared fixtures for integration tests

use gather_herald::types::{
    LinkedPlayer, Lobby, LobbyCreator, PlayerId, RegistryEntry, TwitchIdentity,
};
use gather_herald::utils::current_timestamp;

/// Build a lobby with a given creator and roster.
pub fn lobby(id: u64, creator_id: PlayerId, players: Vec<PlayerId>, picked: u32) -> Lobby {
    Lobby {
        id,
        name: format!("Gather #{}", id),
        creator: LobbyCreator {
            id: creator_id,
            username: format!("creator{}", creator_id),
        },
        players,
        picked_players: picked,
        map_id: 3,
    }
}

/// Build a registry entry linking a channel to a service player.
pub fn registration(twitch_id: &str, channel: &str, player_id: PlayerId, name: &str) -> RegistryEntry {
    RegistryEntry {
        twitch: TwitchIdentity {
            id: twitch_id.to_string(),
            login: channel.to_string(),
            channel: channel.to_string(),
            display_name: name.to_string(),
        },
        player: LinkedPlayer {
            id: player_id,
            name: name.to_string(),
        },
        disabled_commands: Vec::new(),
        registered_at: current_timestamp(),
    }
}
