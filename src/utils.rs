//! Utility functions for the gather notification bot

use chrono::{DateTime, Utc};

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Normalize a channel name to the bot's internal form: lowercase, no `#`.
pub fn normalize_channel(channel: &str) -> String {
    channel.trim_start_matches('#').to_lowercase()
}

/// Render a channel name in IRC form, with a leading `#`.
pub fn irc_channel(channel: &str) -> String {
    format!("#{}", normalize_channel(channel))
}
