//! Rendering of lobby notifications for chat
//!
//! Two templates exist: moderator channels get a deep link to the lobby and
//! no lobby name, everyone else gets the lobby name and no link. The split
//! lives behind a single `render` function so both templates stay testable
//! without live moderator-check I/O.

use crate::error::HeraldError;
use crate::types::{Lobby, NotificationCandidate, RenderedMessage};

/// Upstream lobbies always fill toward two teams of five.
pub const LOBBY_CAPACITY: u32 = 10;

/// Render one notification line for a resolved candidate.
///
/// Fails only when the lobby reports more picked players than it has
/// players at all; callers skip the candidate and keep the tick alive.
pub fn render(
    candidate: &NotificationCandidate,
    lobby: &Lobby,
    map_name: &str,
    is_moderator: bool,
    link_base: &str,
) -> Result<RenderedMessage, HeraldError> {
    if lobby.picked_players as usize > lobby.players.len() {
        return Err(HeraldError::InvalidRoster {
            lobby_id: lobby.id,
            reason: format!(
                "picked_players {} exceeds roster size {}",
                lobby.picked_players,
                lobby.players.len()
            ),
        });
    }

    let streamer = &candidate.entry.player.name;
    let phrase = if lobby.creator.id == candidate.entry.player.id {
        "started a gather lobby".to_string()
    } else {
        format!("joined {}'s gather lobby", lobby.creator.username)
    };

    let waiting = lobby.waiting();
    let text = if is_moderator {
        format!(
            "{} {}: {}/{} {}, Waiting: {}, Picked: {}/{}",
            streamer,
            phrase,
            link_base,
            lobby.id,
            map_name,
            waiting,
            lobby.picked_players,
            LOBBY_CAPACITY
        )
    } else {
        format!(
            "{} {}: {}, {}, Waiting: {}, Picked: {}/{}",
            streamer,
            phrase,
            lobby.name,
            map_name,
            waiting,
            lobby.picked_players,
            LOBBY_CAPACITY
        )
    };

    Ok(RenderedMessage {
        channel: candidate.entry.twitch.channel.clone(),
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LinkedPlayer, LobbyCreator, RegistryEntry, TwitchIdentity};
    use crate::utils::current_timestamp;

    const LINK_BASE: &str = "https://www.esportal.com/sv/gather";

    fn candidate(player_id: u64, name: &str) -> NotificationCandidate {
        NotificationCandidate {
            entry: RegistryEntry {
                twitch: TwitchIdentity {
                    id: "42".to_string(),
                    login: "streamer_x".to_string(),
                    channel: "streamer_x".to_string(),
                    display_name: "Streamer_X".to_string(),
                },
                player: LinkedPlayer {
                    id: player_id,
                    name: name.to_string(),
                },
                disabled_commands: Vec::new(),
                registered_at: current_timestamp(),
            },
            lobby_id: 77,
        }
    }

    fn lobby(creator_id: u64, players: Vec<u64>, picked: u32) -> Lobby {
        Lobby {
            id: 77,
            name: "Mirage only".to_string(),
            creator: LobbyCreator {
                id: creator_id,
                username: "hostname".to_string(),
            },
            players,
            picked_players: picked,
            map_id: 3,
        }
    }

    #[test]
    fn test_creator_gets_started_phrase() {
        let message = render(
            &candidate(10, "Raynna"),
            &lobby(10, vec![10, 11], 1),
            "de_mirage",
            false,
            LINK_BASE,
        )
        .unwrap();

        assert_eq!(
            message.text,
            "Raynna started a gather lobby: Mirage only, de_mirage, Waiting: 1, Picked: 1/10"
        );
        assert_eq!(message.channel, "streamer_x");
    }

    #[test]
    fn test_joiner_gets_joined_phrase() {
        let message = render(
            &candidate(11, "Raynna"),
            &lobby(10, vec![10, 11], 0),
            "de_dust2",
            false,
            LINK_BASE,
        )
        .unwrap();

        assert!(message.text.starts_with("Raynna joined hostname's gather lobby:"));
    }

    #[test]
    fn test_moderator_template_links_and_omits_name() {
        let message = render(
            &candidate(10, "Raynna"),
            &lobby(10, vec![10, 11], 1),
            "de_mirage",
            true,
            LINK_BASE,
        )
        .unwrap();

        assert_eq!(
            message.text,
            "Raynna started a gather lobby: https://www.esportal.com/sv/gather/77 de_mirage, \
             Waiting: 1, Picked: 1/10"
        );
        assert!(!message.text.contains("Mirage only"));
    }

    #[test]
    fn test_non_moderator_template_omits_link() {
        let message = render(
            &candidate(10, "Raynna"),
            &lobby(10, vec![10], 0),
            "de_inferno",
            false,
            LINK_BASE,
        )
        .unwrap();

        assert!(!message.text.contains("https://"));
        assert!(message.text.contains("Mirage only"));
    }

    #[test]
    fn test_waiting_arithmetic_from_snapshot() {
        // Two players in the roster, one already picked.
        let message = render(
            &candidate(10, "StreamerX"),
            &lobby(99, vec![99, 10], 1),
            "de_mirage",
            false,
            LINK_BASE,
        )
        .unwrap();

        assert!(message.text.contains("Waiting: 1"));
        assert!(message.text.contains("Picked: 1/10"));
    }

    #[test]
    fn test_overpicked_roster_is_rejected() {
        let result = render(
            &candidate(10, "Raynna"),
            &lobby(10, vec![10], 3),
            "de_mirage",
            false,
            LINK_BASE,
        );

        assert!(matches!(
            result,
            Err(HeraldError::InvalidRoster { lobby_id: 77, .. })
        ));
    }
}
