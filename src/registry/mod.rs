//! Persisted channel registry
//!
//! Maps Twitch identities to gather-service players. The store is re-read
//! from durable storage at the start of every gather tick; the polling core
//! never mutates it (only the registration and toggle commands do).

pub mod store;

pub use store::{FileRegistryStore, InMemoryRegistryStore, RegistryMap, RegistryStore};

use crate::types::{PlayerId, RegistryEntry};

/// Read-only, by-service-player-id view over one loaded registry snapshot.
pub struct RegistryLookup<'a> {
    entries: &'a RegistryMap,
}

impl<'a> RegistryLookup<'a> {
    pub fn new(entries: &'a RegistryMap) -> Self {
        Self { entries }
    }

    /// Find the entry linked to a gather-service player id.
    ///
    /// A player id is assumed to appear in at most one entry; with
    /// duplicates the first match wins.
    pub fn by_player_id(&self, player_id: PlayerId) -> Option<&'a RegistryEntry> {
        self.entries
            .values()
            .find(|entry| entry.player.id == player_id)
    }

    /// Find the entry for a channel (internal form, no `#`).
    pub fn by_channel(&self, channel: &str) -> Option<&'a RegistryEntry> {
        self.entries
            .values()
            .find(|entry| entry.twitch.channel == channel)
    }

    /// All channels the registry wants the bot present in.
    pub fn channels(&self) -> Vec<String> {
        self.entries
            .values()
            .map(|entry| entry.twitch.channel.clone())
            .collect()
    }
}
