//! Correlation of changed lobbies against registered, connected streamers
//!
//! This is the reconciliation point between three independently-keyed
//! datasets: the lobby snapshot (keyed by lobby id), the channel registry
//! (keyed by Twitch user id) and the live connection set (keyed by channel
//! name). Candidates are built from the changed-lobby scan and then
//! re-resolved against the current snapshot, because the upstream list may
//! have moved on between the diff pass and the notify pass.

use crate::registry::RegistryLookup;
use crate::types::{find_lobby, GatherList, Lobby, NotificationCandidate};
use std::collections::HashSet;

/// Build notification candidates for every registered player that newly
/// appears in a changed lobby's roster.
///
/// Skip rules, in order:
/// - the player id has no registry entry;
/// - the lobby existed in `previous` and already contained this player
///   (the diff was caused by somebody else joining the same lobby);
/// - the entry's channel is not currently connected.
pub fn correlate(
    changed: &[Lobby],
    previous: Option<&GatherList>,
    lookup: &RegistryLookup<'_>,
    connected: &HashSet<String>,
) -> Vec<NotificationCandidate> {
    let mut candidates = Vec::new();

    for lobby in changed {
        for player_id in &lobby.players {
            let Some(entry) = lookup.by_player_id(*player_id) else {
                continue;
            };

            let already_known = previous
                .and_then(|prev| find_lobby(prev, lobby.id))
                .is_some_and(|prior| prior.players.contains(player_id));
            if already_known {
                continue;
            }

            if !connected.contains(&entry.twitch.channel) {
                continue;
            }

            candidates.push(NotificationCandidate {
                entry: entry.clone(),
                lobby_id: lobby.id,
            });
        }
    }

    candidates
}

/// Re-resolve each candidate's lobby against the current snapshot.
///
/// The changed-lobby list can hold stale copies; rendering must use the
/// lobby as it is now. A candidate whose player is no longer in the current
/// roster lost the race between detection and resolution and is dropped.
pub fn resolve_candidates<'a>(
    candidates: Vec<NotificationCandidate>,
    current: &'a GatherList,
) -> Vec<(NotificationCandidate, &'a Lobby)> {
    candidates
        .into_iter()
        .filter_map(|candidate| {
            let lobby = find_lobby(current, candidate.lobby_id)?;
            if !lobby.players.contains(&candidate.entry.player.id) {
                return None;
            }
            Some((candidate, lobby))
        })
        .collect()
}
