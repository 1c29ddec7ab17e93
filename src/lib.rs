//! Gather Herald - Twitch chat bot for gather lobby notifications
//!
//! This crate polls an Esportal-shaped gather service for forming lobbies
//! and a maintenance flag, diffs consecutive snapshots, and announces
//! changes in the Twitch channels of registered streamers.

pub mod chat;
pub mod config;
pub mod error;
pub mod gather;
pub mod maintenance;
pub mod metrics;
pub mod registry;
pub mod service;
pub mod types;
pub mod upstream;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{HeraldError, Result};
pub use types::*;

// Re-export key components
pub use chat::client::ChatClient;
pub use gather::watcher::GatherWatcher;
pub use maintenance::MaintenanceWatcher;
pub use registry::{RegistryLookup, RegistryStore};
pub use upstream::api::GatherApi;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
