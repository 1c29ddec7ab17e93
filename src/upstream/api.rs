//! Gather service HTTP client

use crate::error::{HeraldError, Result};
use crate::types::GatherList;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Trait for fetching gather-service state
#[async_trait]
pub trait GatherApi: Send + Sync {
    /// Fetch the current list of forming lobbies.
    async fn fetch_gather_list(&self) -> Result<GatherList>;

    /// Fetch the maintenance banner, if the service is down for maintenance.
    ///
    /// `Ok(None)` means the service is up; an error means this tick could
    /// not observe the flag at all.
    async fn fetch_maintenance(&self) -> Result<Option<String>>;
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.esportal.com".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// reqwest-based implementation of [`GatherApi`]
pub struct HttpGatherApi {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpGatherApi {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| HeraldError::FetchFailed {
                message: format!("building HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl GatherApi for HttpGatherApi {
    async fn fetch_gather_list(&self) -> Result<GatherList> {
        let url = self.url("gather/list");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| HeraldError::FetchFailed {
                message: format!("GET {}: {}", url, e),
            })?
            .error_for_status()
            .map_err(|e| HeraldError::FetchFailed {
                message: format!("GET {}: {}", url, e),
            })?;

        let list: GatherList =
            response
                .json()
                .await
                .map_err(|e| HeraldError::FetchFailed {
                    message: format!("decoding gather list: {}", e),
                })?;

        debug!("Fetched gather list with {} lobbies", list.len());
        Ok(list)
    }

    async fn fetch_maintenance(&self) -> Result<Option<String>> {
        let url = self.url("maintenance");
        let response =
            self.client
                .get(&url)
                .send()
                .await
                .map_err(|e| HeraldError::FetchFailed {
                    message: format!("GET {}: {}", url, e),
                })?;

        // The endpoint answers 404 while the service runs normally.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = response
            .error_for_status()
            .map_err(|e| HeraldError::FetchFailed {
                message: format!("GET {}: {}", url, e),
            })?;

        let body = response
            .text()
            .await
            .map_err(|e| HeraldError::FetchFailed {
                message: format!("reading maintenance body: {}", e),
            })?;

        let trimmed = body.trim().trim_matches('"').to_string();
        if trimmed.is_empty() || trimmed == "null" {
            Ok(None)
        } else {
            Ok(Some(trimmed))
        }
    }
}

/// Scriptable mock API for tests: pops one queued response per fetch.
#[derive(Debug, Default)]
pub struct MockGatherApi {
    lists: Mutex<Vec<Result<GatherList>>>,
    maintenance: Mutex<Vec<Result<Option<String>>>>,
}

impl MockGatherApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next `fetch_gather_list` response.
    pub fn push_list(&self, response: Result<GatherList>) {
        if let Ok(mut lists) = self.lists.lock() {
            lists.push(response);
        }
    }

    /// Queue the next `fetch_maintenance` response.
    pub fn push_maintenance(&self, response: Result<Option<String>>) {
        if let Ok(mut maintenance) = self.maintenance.lock() {
            maintenance.push(response);
        }
    }
}

#[async_trait]
impl GatherApi for MockGatherApi {
    async fn fetch_gather_list(&self) -> Result<GatherList> {
        let mut lists = self.lists.lock().map_err(|_| HeraldError::InternalError {
            message: "Failed to acquire mock list lock".to_string(),
        })?;
        if lists.is_empty() {
            return Err(HeraldError::FetchFailed {
                message: "mock has no queued gather list".to_string(),
            }
            .into());
        }
        lists.remove(0)
    }

    async fn fetch_maintenance(&self) -> Result<Option<String>> {
        let mut maintenance = self
            .maintenance
            .lock()
            .map_err(|_| HeraldError::InternalError {
                message: "Failed to acquire mock maintenance lock".to_string(),
            })?;
        if maintenance.is_empty() {
            return Ok(None);
        }
        maintenance.remove(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_config_default() {
        let config = ApiConfig::default();
        assert!(config.base_url.starts_with("https://"));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let api = HttpGatherApi::new(ApiConfig {
            base_url: "https://api.example.com/".to_string(),
            request_timeout: Duration::from_secs(1),
        })
        .unwrap();

        assert_eq!(api.url("gather/list"), "https://api.example.com/gather/list");
    }

    #[tokio::test]
    async fn test_mock_pops_responses_in_order() {
        let mock = MockGatherApi::new();
        mock.push_list(Ok(vec![]));
        mock.push_list(Err(HeraldError::FetchFailed {
            message: "down".to_string(),
        }
        .into()));

        assert!(mock.fetch_gather_list().await.unwrap().is_empty());
        assert!(mock.fetch_gather_list().await.is_err());
        // Queue exhausted counts as a failure too.
        assert!(mock.fetch_gather_list().await.is_err());
    }

    #[tokio::test]
    async fn test_mock_maintenance_defaults_to_absent() {
        let mock = MockGatherApi::new();
        assert_eq!(mock.fetch_maintenance().await.unwrap(), None);
    }
}
