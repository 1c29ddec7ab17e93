//! Minimal Twitch IRC session
//!
//! Speaks just enough of the Twitch chat dialect for this bot: tag-capable
//! login, JOIN, PRIVMSG out, PING/PONG keepalive, and USERSTATE tracking so
//! the notifier can branch on the bot's own moderator badge. One task owns
//! the socket reader, one the writer; everything else talks to them over
//! channels.

use crate::chat::client::{ChatClient, ChatMessage};
use crate::chat::fonts::{apply_style, FontStyle};
use crate::error::{HeraldError, Result};
use crate::utils::{irc_channel, normalize_channel};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

/// Connection settings for the Twitch IRC endpoint
#[derive(Debug, Clone)]
pub struct IrcConfig {
    pub server: String,
    pub port: u16,
    /// Bot login name
    pub nick: String,
    /// OAuth token, `oauth:` prefix included
    pub token: String,
    /// Style applied to outgoing lines
    pub font: FontStyle,
}

impl Default for IrcConfig {
    fn default() -> Self {
        Self {
            server: "irc.chat.twitch.tv".to_string(),
            port: 6667,
            nick: "justinfan12345".to_string(),
            token: "oauth:anonymous".to_string(),
            font: FontStyle::Plain,
        }
    }
}

/// Live Twitch IRC session implementing [`ChatClient`]
pub struct TwitchIrcClient {
    font: FontStyle,
    outbound: mpsc::Sender<String>,
    joined: Arc<RwLock<HashSet<String>>>,
    moderator_in: Arc<RwLock<HashSet<String>>>,
}

impl TwitchIrcClient {
    /// Connect, authenticate and start the reader/writer tasks.
    ///
    /// Returns the client plus the stream of inbound chat messages (for the
    /// command router).
    pub async fn connect(config: IrcConfig) -> Result<(Self, mpsc::Receiver<ChatMessage>)> {
        let address = format!("{}:{}", config.server, config.port);
        let stream =
            TcpStream::connect(&address)
                .await
                .map_err(|e| HeraldError::ChatConnectionFailed {
                    message: format!("connecting to {}: {}", address, e),
                })?;
        info!("Connected to chat server {}", address);

        let (read_half, mut write_half) = stream.into_split();
        let (outbound, mut outbound_rx) = mpsc::channel::<String>(64);
        let (inbound_tx, inbound_rx) = mpsc::channel::<ChatMessage>(64);

        // Writer task: serializes all outbound lines onto the socket.
        tokio::spawn(async move {
            while let Some(line) = outbound_rx.recv().await {
                let framed = format!("{}\r\n", line);
                if let Err(e) = write_half.write_all(framed.as_bytes()).await {
                    warn!("Chat writer stopped: {}", e);
                    break;
                }
            }
        });

        let joined = Arc::new(RwLock::new(HashSet::new()));
        let moderator_in = Arc::new(RwLock::new(HashSet::new()));

        // Reader task: keepalive and inbound parsing.
        {
            let outbound = outbound.clone();
            let moderator_in = Arc::clone(&moderator_in);
            tokio::spawn(async move {
                let mut lines = BufReader::new(read_half).lines();
                loop {
                    match lines.next_line().await {
                        Ok(Some(line)) => {
                            if let Some(event) = parse_line(&line) {
                                handle_event(event, &outbound, &moderator_in, &inbound_tx).await;
                            }
                        }
                        Ok(None) => {
                            warn!("Chat server closed the connection");
                            break;
                        }
                        Err(e) => {
                            warn!("Chat reader stopped: {}", e);
                            break;
                        }
                    }
                }
            });
        }

        let client = Self {
            font: config.font,
            outbound: outbound.clone(),
            joined,
            moderator_in,
        };

        client.send_raw(format!("PASS {}", config.token)).await?;
        client.send_raw(format!("NICK {}", config.nick)).await?;
        client
            .send_raw("CAP REQ :twitch.tv/tags twitch.tv/commands".to_string())
            .await?;

        Ok((client, inbound_rx))
    }

    async fn send_raw(&self, line: String) -> Result<()> {
        self.outbound
            .send(line)
            .await
            .map_err(|_| {
                HeraldError::ChatConnectionFailed {
                    message: "chat writer task is gone".to_string(),
                }
                .into()
            })
    }
}

#[async_trait]
impl ChatClient for TwitchIrcClient {
    async fn connected_channels(&self) -> HashSet<String> {
        self.joined.read().await.clone()
    }

    async fn is_moderator(&self, channel: &str) -> Result<bool> {
        let channel = normalize_channel(channel);
        Ok(self.moderator_in.read().await.contains(&channel))
    }

    async fn join(&self, channel: &str) -> Result<()> {
        let channel = normalize_channel(channel);
        self.send_raw(format!("JOIN {}", irc_channel(&channel))).await?;
        self.joined.write().await.insert(channel.clone());
        info!("Joined channel {}", channel);
        Ok(())
    }

    async fn say(&self, channel: &str, text: &str) -> Result<()> {
        let channel = normalize_channel(channel);
        let styled = apply_style(text, self.font);
        self.outbound
            .send(format!("PRIVMSG {} :{}", irc_channel(&channel), styled))
            .await
            .map_err(|_| {
                HeraldError::SendFailed {
                    channel,
                    message: "chat writer task is gone".to_string(),
                }
                .into()
            })
    }
}

/// One parsed inbound IRC line
#[derive(Debug, Clone, PartialEq, Eq)]
enum IrcEvent {
    Ping { payload: String },
    UserState { channel: String, is_mod: bool },
    Privmsg(ChatMessage),
}

async fn handle_event(
    event: IrcEvent,
    outbound: &mpsc::Sender<String>,
    moderator_in: &Arc<RwLock<HashSet<String>>>,
    inbound_tx: &mpsc::Sender<ChatMessage>,
) {
    match event {
        IrcEvent::Ping { payload } => {
            let _ = outbound.send(format!("PONG :{}", payload)).await;
        }
        IrcEvent::UserState { channel, is_mod } => {
            debug!("USERSTATE in {}: mod={}", channel, is_mod);
            let mut set = moderator_in.write().await;
            if is_mod {
                set.insert(channel);
            } else {
                set.remove(&channel);
            }
        }
        IrcEvent::Privmsg(message) => {
            // A full inbox only costs us commands, never notifications.
            if inbound_tx.try_send(message).is_err() {
                warn!("Inbound chat queue full, dropping message");
            }
        }
    }
}

/// Parse one raw IRC line into an event the session cares about.
fn parse_line(line: &str) -> Option<IrcEvent> {
    let mut rest = line.trim_end();

    let tags = if let Some(tagged) = rest.strip_prefix('@') {
        let (raw_tags, remainder) = tagged.split_once(' ')?;
        rest = remainder;
        parse_tags(raw_tags)
    } else {
        HashMap::new()
    };

    let prefix = if let Some(prefixed) = rest.strip_prefix(':') {
        let (prefix, remainder) = prefixed.split_once(' ')?;
        rest = remainder;
        Some(prefix)
    } else {
        None
    };

    let (command, params) = match rest.split_once(' ') {
        Some((command, params)) => (command, params),
        None => (rest, ""),
    };

    match command {
        "PING" => Some(IrcEvent::Ping {
            payload: params.trim_start_matches(':').to_string(),
        }),
        "USERSTATE" => {
            let channel = normalize_channel(params.split_whitespace().next()?);
            Some(IrcEvent::UserState {
                channel,
                is_mod: tag_grants_moderator(&tags),
            })
        }
        "PRIVMSG" => {
            let (target, trailing) = params.split_once(" :")?;
            let sender_login = prefix?.split('!').next()?.to_string();
            let sender_display = tags
                .get("display-name")
                .filter(|name| !name.is_empty())
                .map(|name| name.to_string())
                .unwrap_or_else(|| sender_login.clone());

            Some(IrcEvent::Privmsg(ChatMessage {
                channel: normalize_channel(target),
                room_id: tags.get("room-id").unwrap_or(&"").to_string(),
                sender_login,
                sender_display,
                sender_is_mod: tag_grants_moderator(&tags),
                text: trailing.to_string(),
            }))
        }
        _ => None,
    }
}

fn parse_tags(raw: &str) -> HashMap<&str, &str> {
    raw.split(';')
        .filter_map(|pair| pair.split_once('='))
        .collect()
}

fn tag_grants_moderator(tags: &HashMap<&str, &str>) -> bool {
    if tags.get("mod") == Some(&"1") {
        return true;
    }
    tags.get("badges").is_some_and(|badges| {
        badges
            .split(',')
            .any(|badge| badge.starts_with("moderator/") || badge.starts_with("broadcaster/"))
    })
}
