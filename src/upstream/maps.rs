//! Best-effort map-name resolution
//!
//! Map ids come from the lobby payload; names come from a separate endpoint
//! fetched once and cached. Resolution never fails a tick: an unknown id is
//! rendered as the literal id.

use crate::types::MapId;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Trait for resolving a map id into a display name
#[async_trait]
pub trait MapNameResolver: Send + Sync {
    /// Resolve a map id. Never fails; falls back to the literal id.
    async fn resolve(&self, map_id: MapId) -> String;
}

#[derive(Debug, Deserialize)]
struct MapRecord {
    id: MapId,
    name: String,
}

/// HTTP-backed resolver caching the upstream map list
pub struct HttpMapNames {
    client: reqwest::Client,
    url: String,
    cache: RwLock<Option<HashMap<MapId, String>>>,
}

impl HttpMapNames {
    pub fn new(base_url: &str, request_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            url: format!("{}/maps", base_url.trim_end_matches('/')),
            cache: RwLock::new(None),
        }
    }

    async fn fetch_maps(&self) -> Option<HashMap<MapId, String>> {
        let records: Vec<MapRecord> = self
            .client
            .get(&self.url)
            .send()
            .await
            .ok()?
            .error_for_status()
            .ok()?
            .json()
            .await
            .ok()?;

        debug!("Cached {} map names", records.len());
        Some(records.into_iter().map(|m| (m.id, m.name)).collect())
    }
}

#[async_trait]
impl MapNameResolver for HttpMapNames {
    async fn resolve(&self, map_id: MapId) -> String {
        {
            let cache = self.cache.read().await;
            if let Some(names) = cache.as_ref() {
                if let Some(name) = names.get(&map_id) {
                    return name.clone();
                }
            }
        }

        // Cache miss: refresh once, then fall back to the literal id.
        if self.cache.read().await.is_none() {
            match self.fetch_maps().await {
                Some(names) => {
                    let mut cache = self.cache.write().await;
                    *cache = Some(names);
                }
                None => {
                    warn!("Map list fetch failed, rendering map {} as its id", map_id);
                    return map_id.to_string();
                }
            }

            let cache = self.cache.read().await;
            if let Some(name) = cache.as_ref().and_then(|names| names.get(&map_id)) {
                return name.clone();
            }
        }

        map_id.to_string()
    }
}

/// Fixed-table resolver for tests and dry runs
#[derive(Debug, Default)]
pub struct StaticMapNames {
    names: HashMap<MapId, String>,
}

impl StaticMapNames {
    pub fn new(names: impl IntoIterator<Item = (MapId, &'static str)>) -> Self {
        Self {
            names: names
                .into_iter()
                .map(|(id, name)| (id, name.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl MapNameResolver for StaticMapNames {
    async fn resolve(&self, map_id: MapId) -> String {
        self.names
            .get(&map_id)
            .cloned()
            .unwrap_or_else(|| map_id.to_string())
    }
}
