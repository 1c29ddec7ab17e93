//! Registry storage backends
//!
//! The durable format is one JSON object keyed by Twitch user id, matching
//! the file the registration command writes. Loading returns the whole map;
//! the gather tick takes a fresh snapshot each cycle.

use crate::error::{HeraldError, Result};
use crate::types::{RegistryEntry, TwitchUserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::{debug, info};

/// One loaded registry snapshot
pub type RegistryMap = HashMap<TwitchUserId, RegistryEntry>;

/// Trait for loading and persisting channel registrations
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Load the full registry. Called once per gather tick.
    async fn load(&self) -> Result<RegistryMap>;

    /// Insert or replace one entry and persist the result.
    async fn upsert(&self, entry: RegistryEntry) -> Result<()>;
}

/// JSON-file-backed registry store
pub struct FileRegistryStore {
    path: PathBuf,
}

impl FileRegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RegistryStore for FileRegistryStore {
    async fn load(&self) -> Result<RegistryMap> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            // A missing file is an empty registry, not an error.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Registry file {} not found, treating as empty", self.path.display());
                return Ok(RegistryMap::new());
            }
            Err(e) => {
                return Err(HeraldError::RegistryLoadFailed {
                    message: format!("reading {}: {}", self.path.display(), e),
                }
                .into())
            }
        };

        let map: RegistryMap =
            serde_json::from_str(&raw).map_err(|e| HeraldError::RegistryLoadFailed {
                message: format!("parsing {}: {}", self.path.display(), e),
            })?;

        debug!("Loaded {} registry entries from {}", map.len(), self.path.display());
        Ok(map)
    }

    async fn upsert(&self, entry: RegistryEntry) -> Result<()> {
        let mut map = self.load().await?;
        let twitch_id = entry.twitch.id.clone();
        let channel = entry.twitch.channel.clone();
        map.insert(twitch_id, entry);

        let raw =
            serde_json::to_string_pretty(&map).map_err(|e| HeraldError::RegistrySaveFailed {
                message: format!("serializing registry: {}", e),
            })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    HeraldError::RegistrySaveFailed {
                        message: format!("creating {}: {}", parent.display(), e),
                    }
                })?;
            }
        }

        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| HeraldError::RegistrySaveFailed {
                message: format!("writing {}: {}", self.path.display(), e),
            })?;

        info!("Registry updated for channel {}", channel);
        Ok(())
    }
}

/// In-memory registry store for tests and dry runs
#[derive(Debug, Default)]
pub struct InMemoryRegistryStore {
    entries: RwLock<RegistryMap>,
}

impl InMemoryRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with entries.
    pub fn with_entries(entries: Vec<RegistryEntry>) -> Self {
        let store = Self::new();
        {
            let mut map = store.entries.write().expect("registry lock poisoned");
            for entry in entries {
                map.insert(entry.twitch.id.clone(), entry);
            }
        }
        store
    }
}

#[async_trait]
impl RegistryStore for InMemoryRegistryStore {
    async fn load(&self) -> Result<RegistryMap> {
        self.entries
            .read()
            .map(|map| map.clone())
            .map_err(|_| {
                HeraldError::InternalError {
                    message: "Failed to acquire registry lock".to_string(),
                }
                .into()
            })
    }

    async fn upsert(&self, entry: RegistryEntry) -> Result<()> {
        let mut map = self.entries.write().map_err(|_| HeraldError::InternalError {
            message: "Failed to acquire registry lock".to_string(),
        })?;
        map.insert(entry.twitch.id.clone(), entry);
        Ok(())
    }
}
