//! Chat transport and chat-facing features
//!
//! The polling core only sees the [`ChatClient`] trait; the Twitch IRC
//! session, the cosmetic font transform and the command router live behind
//! it.

pub mod client;
pub mod commands;
pub mod fonts;
pub mod irc;

pub use client::{ChatClient, ChatMessage, MockChatClient};
pub use commands::CommandRouter;
pub use fonts::{apply_style, FontStyle};
pub use irc::{IrcConfig, TwitchIrcClient};
