//! Configuration management for the gather notification bot
//!
//! This module handles all configuration loading from environment variables
//! or a TOML file, validation, and default values.

pub mod app;

pub use app::{
    validate_config, AppConfig, ChatSettings, RegistrySettings, ServiceSettings, UpstreamSettings,
};
