//! Chat transport interface

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

/// One inbound chat line, parsed from IRC tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Channel the message was posted in (internal form, no `#`)
    pub channel: String,
    /// Twitch user id of the broadcaster (`room-id` tag)
    pub room_id: String,
    /// Sender login
    pub sender_login: String,
    /// Sender display name
    pub sender_display: String,
    /// Sender holds moderator or broadcaster privileges in this channel
    pub sender_is_mod: bool,
    /// Message text
    pub text: String,
}

/// Trait for the live chat session
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Channels the bot currently holds a live session in.
    async fn connected_channels(&self) -> HashSet<String>;

    /// Whether the bot holds moderator privilege in a channel.
    ///
    /// Callers treat a failure as `false`.
    async fn is_moderator(&self, channel: &str) -> Result<bool>;

    /// Join a channel.
    async fn join(&self, channel: &str) -> Result<()>;

    /// Send a line of chat. Fire-and-forget: failures are for the caller to
    /// log and swallow.
    async fn say(&self, channel: &str, text: &str) -> Result<()>;
}

/// Recording chat client for tests
#[derive(Debug, Default)]
pub struct MockChatClient {
    channels: Mutex<HashSet<String>>,
    moderator_in: Mutex<HashSet<String>>,
    sent: Mutex<Vec<(String, String)>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client already connected to the given channels.
    pub fn with_channels(channels: &[&str]) -> Self {
        let client = Self::new();
        if let Ok(mut set) = client.channels.lock() {
            set.extend(channels.iter().map(|c| c.to_string()));
        }
        client
    }

    /// Grant the bot moderator status in a channel.
    pub fn grant_moderator(&self, channel: &str) {
        if let Ok(mut set) = self.moderator_in.lock() {
            set.insert(channel.to_string());
        }
    }

    /// All `(channel, text)` pairs sent so far.
    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn connected_channels(&self) -> HashSet<String> {
        self.channels
            .lock()
            .map(|set| set.clone())
            .unwrap_or_default()
    }

    async fn is_moderator(&self, channel: &str) -> Result<bool> {
        Ok(self
            .moderator_in
            .lock()
            .map(|set| set.contains(channel))
            .unwrap_or(false))
    }

    async fn join(&self, channel: &str) -> Result<()> {
        if let Ok(mut set) = self.channels.lock() {
            set.insert(channel.to_string());
        }
        Ok(())
    }

    async fn say(&self, channel: &str, text: &str) -> Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((channel.to_string(), text.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_sends() {
        let client = MockChatClient::with_channels(&["alpha"]);
        client.say("alpha", "hello").await.unwrap();

        assert_eq!(
            client.sent_messages(),
            vec![("alpha".to_string(), "hello".to_string())]
        );
    }

    #[tokio::test]
    async fn test_mock_moderator_grant() {
        let client = MockChatClient::new();
        assert!(!client.is_moderator("alpha").await.unwrap());

        client.grant_moderator("alpha");
        assert!(client.is_moderator("alpha").await.unwrap());
    }

    #[tokio::test]
    async fn test_join_updates_connected_set() {
        let client = MockChatClient::new();
        client.join("beta").await.unwrap();
        assert!(client.connected_channels().await.contains("beta"));
    }
}
