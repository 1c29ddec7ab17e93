//! Change detection between consecutive gather list snapshots
//!
//! The upstream service offers no diff feed; "what changed" is reconstructed
//! from two whole snapshots. A lobby counts as changed when it is new, or
//! when its roster differs positionally from the previous snapshot's roster
//! for the same lobby id.

use crate::types::{find_lobby, GatherList, Lobby};

/// Compute the lobbies in `current` that are new or whose roster changed.
///
/// Roster comparison is positional over the upstream order, not set-based:
/// a reordered-but-equal roster is reported as changed. The output contains
/// each lobby at most once, in `current` order. With no previous snapshot
/// there is nothing to compare against and the result is empty; the first
/// poll only seeds the snapshot store.
pub fn detect_changes(previous: Option<&GatherList>, current: &GatherList) -> Vec<Lobby> {
    let Some(previous) = previous else {
        return Vec::new();
    };

    current
        .iter()
        .filter(|lobby| match find_lobby(previous, lobby.id) {
            None => true,
            Some(prior) => prior.players != lobby.players,
        })
        .cloned()
        .collect()
}
