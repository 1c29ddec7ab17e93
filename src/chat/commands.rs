//! Chat command routing
//!
//! Two commands exist: one-shot channel registration and per-channel command
//! toggling. Both are moderator-gated and answer in the channel they were
//! issued from. A command disabled for a channel is dropped before dispatch.

use crate::chat::client::{ChatClient, ChatMessage};
use crate::error::Result;
use crate::registry::RegistryStore;
use crate::types::{LinkedPlayer, RegistryEntry, TwitchIdentity};
use crate::utils::current_timestamp;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Commands a channel can toggle
pub const VALID_COMMANDS: &[&str] = &["register", "toggle", "gather"];

/// Routes inbound chat messages to command handlers
pub struct CommandRouter {
    registry: Arc<dyn RegistryStore>,
    chat: Arc<dyn ChatClient>,
    prefix: char,
}

impl CommandRouter {
    pub fn new(registry: Arc<dyn RegistryStore>, chat: Arc<dyn ChatClient>, prefix: char) -> Self {
        Self {
            registry,
            chat,
            prefix,
        }
    }

    /// Handle one inbound message; non-commands are ignored.
    pub async fn handle(&self, message: &ChatMessage) {
        let Some(rest) = message.text.strip_prefix(self.prefix) else {
            return;
        };
        let mut parts = rest.splitn(2, ' ');
        let command = match parts.next() {
            Some(command) if !command.is_empty() => command.to_lowercase(),
            _ => return,
        };
        let argument = parts.next().unwrap_or("").trim().to_string();

        if !VALID_COMMANDS.contains(&command.as_str()) {
            return;
        }

        if self.is_disabled(message, &command).await {
            debug!(
                "Dropping disabled command '{}' in channel {}",
                command, message.channel
            );
            return;
        }

        let reply = match command.as_str() {
            "register" => self.handle_register(message, &argument).await,
            "toggle" => self.handle_toggle(message, &argument).await,
            // `gather` only exists as a toggle target for notifications.
            _ => Ok(None),
        };

        match reply {
            Ok(Some(text)) => {
                if let Err(e) = self.chat.say(&message.channel, &text).await {
                    error!("Failed to reply in {}: {}", message.channel, e);
                }
            }
            Ok(None) => {}
            Err(e) => {
                error!(
                    "Error executing command '{}' in {}: {}",
                    command, message.channel, e
                );
                let apology = format!("An error occured while executing command {}.", command);
                let _ = self.chat.say(&message.channel, &apology).await;
            }
        }
    }

    async fn is_disabled(&self, message: &ChatMessage, command: &str) -> bool {
        match self.registry.load().await {
            Ok(map) => map
                .get(&message.room_id)
                .is_some_and(|entry| entry.disabled_commands.iter().any(|c| c == command)),
            Err(e) => {
                error!("Registry load failed during command dispatch: {}", e);
                false
            }
        }
    }

    async fn handle_register(
        &self,
        message: &ChatMessage,
        argument: &str,
    ) -> Result<Option<String>> {
        if !message.sender_is_mod {
            return Ok(None);
        }

        let mut args = argument.split_whitespace();
        let (Some(player_name), Some(raw_id)) = (args.next(), args.next()) else {
            return Ok(Some(format!(
                "Usage: {}register <player name> <player id>",
                self.prefix
            )));
        };
        let Ok(player_id) = raw_id.parse::<u64>() else {
            return Ok(Some(format!("{} is not a valid player id.", raw_id)));
        };

        let map = self.registry.load().await?;
        if let Some(existing) = map.get(&message.room_id) {
            return Ok(Some(format!(
                "Twitch channel {} is already registered on the bot.",
                existing.twitch.channel
            )));
        }

        let entry = RegistryEntry {
            twitch: TwitchIdentity {
                id: message.room_id.clone(),
                login: message.channel.clone(),
                channel: message.channel.clone(),
                display_name: message.sender_display.clone(),
            },
            player: LinkedPlayer {
                id: player_id,
                name: player_name.to_string(),
            },
            disabled_commands: Vec::new(),
            registered_at: current_timestamp(),
        };
        self.registry.upsert(entry).await?;

        info!(
            "Registered channel {} (id: {})",
            message.channel, message.room_id
        );
        Ok(Some(format!(
            "Bot registered on channel: {} (id: {}).",
            message.channel, message.room_id
        )))
    }

    async fn handle_toggle(&self, message: &ChatMessage, argument: &str) -> Result<Option<String>> {
        if !message.sender_is_mod {
            return Ok(None);
        }

        let argument = argument.to_lowercase();
        if argument.is_empty() {
            return Ok(Some(format!(
                "Please provide a command, usage; -> {}toggle command, commands -> {}",
                self.prefix,
                format_command_list(VALID_COMMANDS.iter().copied())
            )));
        }

        let map = self.registry.load().await?;
        let Some(entry) = map.get(&message.room_id) else {
            return Ok(Some(format!(
                "This channel is not registered yet, use {}register first.",
                self.prefix
            )));
        };

        if argument == "enabled" {
            let enabled = VALID_COMMANDS
                .iter()
                .copied()
                .filter(|c| !entry.disabled_commands.iter().any(|d| d == c));
            return Ok(Some(format!(
                "Enabled commands in {} are: {}",
                message.channel,
                format_command_list(enabled)
            )));
        }
        if argument == "disabled" {
            return Ok(Some(format!(
                "Disabled commands in {} are: {}",
                message.channel,
                format_command_list(entry.disabled_commands.iter().map(|c| c.as_str()))
            )));
        }
        if argument == "toggle" {
            return Ok(Some("You can't toggle this command.".to_string()));
        }
        if !VALID_COMMANDS.contains(&argument.as_str()) {
            return Ok(Some(format!(
                "Couldn't find any command with trigger {}.",
                argument
            )));
        }

        let mut updated = entry.clone();
        let now_disabled = if let Some(index) = updated
            .disabled_commands
            .iter()
            .position(|c| c == &argument)
        {
            updated.disabled_commands.remove(index);
            false
        } else {
            updated.disabled_commands.push(argument.clone());
            true
        };
        self.registry.upsert(updated).await?;

        Ok(Some(format!(
            "Command {} is now {} in {}.",
            argument,
            if now_disabled { "disabled" } else { "enabled" },
            message.channel
        )))
    }
}

fn format_command_list<'a>(commands: impl Iterator<Item = &'a str>) -> String {
    let list: Vec<&str> = commands.collect();
    if list.is_empty() {
        "none".to_string()
    } else {
        list.join(", ")
    }
}
