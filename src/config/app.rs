//! Main application configuration
//!
//! This module defines the primary configuration structures for the bot,
//! including environment variable loading and validation.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub upstream: UpstreamSettings,
    pub chat: ChatSettings,
    pub registry: RegistrySettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Port for health check and metrics endpoints
    pub health_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// Upstream gather-service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    /// Base URL of the gather API
    pub base_url: String,
    /// Base URL for lobby deep links in moderator channels
    pub lobby_link_base: String,
    /// Gather list poll interval in seconds
    pub gather_poll_interval_seconds: u64,
    /// Maintenance flag poll interval in seconds
    pub maintenance_poll_interval_seconds: u64,
    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,
}

/// Chat connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// IRC server host
    pub server: String,
    /// IRC server port
    pub port: u16,
    /// Bot login name
    pub nick: String,
    /// OAuth token including the `oauth:` prefix
    pub token: String,
    /// Command prefix character
    pub command_prefix: char,
    /// Cosmetic font style for outgoing lines (plain, bold, italic, monospace)
    pub font_style: String,
}

/// Registry storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Path of the JSON registry file
    pub path: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "gather-herald".to_string(),
            log_level: "info".to_string(),
            health_port: 8080,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.esportal.com".to_string(),
            lobby_link_base: "https://www.esportal.com/sv/gather".to_string(),
            gather_poll_interval_seconds: 30,
            maintenance_poll_interval_seconds: 60,
            request_timeout_seconds: 10,
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            server: "irc.chat.twitch.tv".to_string(),
            port: 6667,
            nick: "gather_herald".to_string(),
            token: String::new(),
            command_prefix: '!',
            font_style: "plain".to_string(),
        }
    }
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            path: "registry.json".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }
        if let Ok(port) = env::var("HEALTH_PORT") {
            config.service.health_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid HEALTH_PORT value: {}", port))?;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            config.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Upstream settings
        if let Ok(url) = env::var("GATHER_API_URL") {
            config.upstream.base_url = url;
        }
        if let Ok(link) = env::var("GATHER_LOBBY_LINK_BASE") {
            config.upstream.lobby_link_base = link;
        }
        if let Ok(interval) = env::var("GATHER_POLL_INTERVAL_SECONDS") {
            config.upstream.gather_poll_interval_seconds = interval
                .parse()
                .map_err(|_| anyhow!("Invalid GATHER_POLL_INTERVAL_SECONDS value: {}", interval))?;
        }
        if let Ok(interval) = env::var("MAINTENANCE_POLL_INTERVAL_SECONDS") {
            config.upstream.maintenance_poll_interval_seconds = interval.parse().map_err(|_| {
                anyhow!(
                    "Invalid MAINTENANCE_POLL_INTERVAL_SECONDS value: {}",
                    interval
                )
            })?;
        }
        if let Ok(timeout) = env::var("REQUEST_TIMEOUT_SECONDS") {
            config.upstream.request_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid REQUEST_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Chat settings
        if let Ok(server) = env::var("CHAT_SERVER") {
            config.chat.server = server;
        }
        if let Ok(port) = env::var("CHAT_PORT") {
            config.chat.port = port
                .parse()
                .map_err(|_| anyhow!("Invalid CHAT_PORT value: {}", port))?;
        }
        if let Ok(nick) = env::var("TWITCH_BOT_USERNAME") {
            config.chat.nick = nick;
        }
        if let Ok(token) = env::var("TWITCH_OAUTH_TOKEN") {
            config.chat.token = token;
        }
        if let Ok(font) = env::var("CHAT_FONT_STYLE") {
            config.chat.font_style = font;
        }

        // Registry settings
        if let Ok(path) = env::var("REGISTRY_PATH") {
            config.registry.path = path;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            anyhow!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            )
        })?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| anyhow!("Failed to parse config file: {}", e))?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Get gather poll interval as Duration
    pub fn gather_poll_interval(&self) -> Duration {
        Duration::from_secs(self.upstream.gather_poll_interval_seconds)
    }

    /// Get maintenance poll interval as Duration
    pub fn maintenance_poll_interval(&self) -> Duration {
        Duration::from_secs(self.upstream.maintenance_poll_interval_seconds)
    }

    /// Get per-request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.request_timeout_seconds)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate ports
    if config.service.health_port == 0 {
        return Err(anyhow!("Health port cannot be 0"));
    }
    if config.chat.port == 0 {
        return Err(anyhow!("Chat port cannot be 0"));
    }

    // Validate timeouts and intervals
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }
    if config.upstream.gather_poll_interval_seconds == 0 {
        return Err(anyhow!("Gather poll interval must be greater than 0"));
    }
    if config.upstream.maintenance_poll_interval_seconds == 0 {
        return Err(anyhow!("Maintenance poll interval must be greater than 0"));
    }
    if config.upstream.request_timeout_seconds == 0 {
        return Err(anyhow!("Request timeout must be greater than 0"));
    }

    // Validate upstream URLs
    if config.upstream.base_url.is_empty() {
        return Err(anyhow!("Gather API URL cannot be empty"));
    }
    if config.upstream.lobby_link_base.is_empty() {
        return Err(anyhow!("Lobby link base cannot be empty"));
    }

    // Validate chat settings
    if config.chat.server.is_empty() {
        return Err(anyhow!("Chat server cannot be empty"));
    }
    if config.chat.nick.is_empty() {
        return Err(anyhow!("Chat nick cannot be empty"));
    }

    // Validate registry settings
    if config.registry.path.is_empty() {
        return Err(anyhow!("Registry path cannot be empty"));
    }

    Ok(())
}
