//! Main application state and service coordination
//!
//! This module contains the production AppState that coordinates the chat
//! session, the two poll loops, the command router and the health server.

use crate::chat::client::{ChatClient, ChatMessage};
use crate::chat::commands::CommandRouter;
use crate::chat::fonts::FontStyle;
use crate::chat::irc::{IrcConfig, TwitchIrcClient};
use crate::config::AppConfig;
use crate::gather::watcher::GatherWatcher;
use crate::maintenance::MaintenanceWatcher;
use crate::metrics::{HealthServer, HealthServerConfig, MetricsCollector};
use crate::registry::{FileRegistryStore, RegistryStore};
use crate::upstream::api::{ApiConfig, GatherApi, HttpGatherApi};
use crate::upstream::maps::{HttpMapNames, MapNameResolver};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Chat connection error: {message}")]
    ChatConnection { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("Background task error: {message}")]
    BackgroundTask { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Live chat session
    chat: Arc<dyn ChatClient>,

    /// Inbound chat messages, consumed by the command router task
    inbound: Option<mpsc::Receiver<ChatMessage>>,

    /// Durable channel registry
    registry: Arc<dyn RegistryStore>,

    /// Upstream gather API
    api: Arc<dyn GatherApi>,

    /// Map-name resolution
    maps: Arc<dyn MapNameResolver>,

    /// Metrics collector shared across tasks
    metrics: Arc<MetricsCollector>,

    /// Health and metrics HTTP server
    health_server: Arc<HealthServer>,

    /// Background task handles
    background_tasks: Vec<JoinHandle<()>>,

    /// Service status
    is_running: Arc<RwLock<bool>>,
}

impl AppState {
    /// Initialize the application with all dependencies
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing gather-herald");
        info!(
            "Configuration: service={}, upstream={}",
            config.service.name, config.upstream.base_url
        );

        let metrics = Arc::new(MetricsCollector::new().map_err(|e| {
            ServiceError::Initialization {
                message: format!("Failed to create metrics collector: {}", e),
            }
        })?);

        let health_server = Arc::new(HealthServer::new(
            HealthServerConfig {
                port: config.service.health_port,
                host: "0.0.0.0".to_string(),
            },
            metrics.clone(),
        ));

        let api = Arc::new(
            HttpGatherApi::new(ApiConfig {
                base_url: config.upstream.base_url.clone(),
                request_timeout: config.request_timeout(),
            })
            .map_err(|e| ServiceError::Initialization {
                message: format!("Failed to create upstream client: {}", e),
            })?,
        );

        let maps = Arc::new(HttpMapNames::new(
            &config.upstream.base_url,
            config.request_timeout(),
        ));

        let registry = Arc::new(FileRegistryStore::new(config.registry.path.clone()));

        let irc_config = IrcConfig {
            server: config.chat.server.clone(),
            port: config.chat.port,
            nick: config.chat.nick.clone(),
            token: config.chat.token.clone(),
            font: FontStyle::parse(&config.chat.font_style),
        };
        let (chat, inbound) =
            TwitchIrcClient::connect(irc_config)
                .await
                .map_err(|e| ServiceError::ChatConnection {
                    message: format!("Failed to connect to chat: {}", e),
                })?;

        Ok(Self {
            config,
            chat: Arc::new(chat),
            inbound: Some(inbound),
            registry,
            api,
            maps,
            metrics,
            health_server,
            background_tasks: Vec::new(),
            is_running: Arc::new(RwLock::new(false)),
        })
    }

    /// Start all background services
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        info!("Starting gather-herald");

        *self.is_running.write().await = true;

        self.start_health_server();
        self.join_registered_channels().await?;
        self.start_command_router()?;
        self.start_poll_tasks();

        info!("gather-herald started successfully");
        Ok(())
    }

    /// Perform graceful shutdown
    pub async fn shutdown(&mut self) {
        info!("Starting graceful shutdown");

        *self.is_running.write().await = false;
        self.health_server.stop();

        let task_count = self.background_tasks.len();
        for task in self.background_tasks.drain(..) {
            task.abort();
        }

        info!("Stopped {} background tasks", task_count);
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the metrics collector
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Serve `/healthz` and `/metrics` in the background.
    fn start_health_server(&mut self) {
        let health_server = self.health_server.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = health_server.start().await {
                error!("Health server failed: {}", e);
            }
        });
        self.background_tasks.push(handle);
    }

    /// Join every channel present in the registry.
    async fn join_registered_channels(&self) -> Result<(), ServiceError> {
        let map = self
            .registry
            .load()
            .await
            .map_err(|e| ServiceError::Initialization {
                message: format!("Failed to load registry: {}", e),
            })?;

        info!("Joining {} registered channels", map.len());
        for entry in map.values() {
            if let Err(e) = self.chat.join(&entry.twitch.channel).await {
                warn!("Failed to join {}: {}", entry.twitch.channel, e);
            }
        }

        Ok(())
    }

    /// Dispatch inbound chat messages to the command router.
    fn start_command_router(&mut self) -> Result<(), ServiceError> {
        let mut inbound = self.inbound.take().ok_or_else(|| ServiceError::Initialization {
            message: "Command router already started".to_string(),
        })?;

        let router = CommandRouter::new(
            self.registry.clone(),
            self.chat.clone(),
            self.config.chat.command_prefix,
        );
        let is_running = self.is_running.clone();

        let handle = tokio::spawn(async move {
            info!("Command router task started");
            while let Some(message) = inbound.recv().await {
                if !*is_running.read().await {
                    break;
                }
                router.handle(&message).await;
            }
            info!("Command router task stopped");
        });
        self.background_tasks.push(handle);

        Ok(())
    }

    /// Start the two independent poll loops.
    ///
    /// Each loop awaits its own tick before sleeping again, so a tick never
    /// overlaps the previous one.
    fn start_poll_tasks(&mut self) {
        let gather_task = {
            let mut watcher = GatherWatcher::new(
                self.api.clone(),
                self.registry.clone(),
                self.chat.clone(),
                self.maps.clone(),
                self.metrics.clone(),
                self.config.upstream.lobby_link_base.clone(),
            );
            let interval = self.config.gather_poll_interval();
            let is_running = self.is_running.clone();

            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                info!("Gather poll task started ({}s interval)", interval.as_secs());

                while *is_running.read().await {
                    ticker.tick().await;
                    if let Err(e) = watcher.tick().await {
                        warn!("Gather tick abandoned: {}", e);
                    }
                }

                info!("Gather poll task stopped");
            })
        };

        let maintenance_task = {
            let mut watcher = MaintenanceWatcher::new(
                self.api.clone(),
                self.chat.clone(),
                self.metrics.clone(),
            );
            let interval = self.config.maintenance_poll_interval();
            let is_running = self.is_running.clone();

            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                info!(
                    "Maintenance poll task started ({}s interval)",
                    interval.as_secs()
                );

                while *is_running.read().await {
                    ticker.tick().await;
                    if let Err(e) = watcher.tick().await {
                        warn!("Maintenance tick failed: {}", e);
                    }
                }

                info!("Maintenance poll task stopped");
            })
        };

        self.background_tasks.push(gather_task);
        self.background_tasks.push(maintenance_task);
    }
}
