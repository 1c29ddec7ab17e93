//! Error types for the gather notification bot
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific bot scenarios
#[derive(Debug, thiserror::Error)]
pub enum HeraldError {
    #[error("Upstream fetch failed: {message}")]
    FetchFailed { message: String },

    #[error("Registry load failed: {message}")]
    RegistryLoadFailed { message: String },

    #[error("Registry save failed: {message}")]
    RegistrySaveFailed { message: String },

    #[error("Lobby {lobby_id} has an invalid roster: {reason}")]
    InvalidRoster { lobby_id: u64, reason: String },

    #[error("Chat connection failed: {message}")]
    ChatConnectionFailed { message: String },

    #[error("Chat send to {channel} failed: {message}")]
    SendFailed { channel: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}
