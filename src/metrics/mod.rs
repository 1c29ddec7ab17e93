//! Metrics and monitoring for the gather notification bot
//!
//! This module provides Prometheus metrics collection and the HTTP health
//! endpoints.

pub mod collector;
pub mod health;

pub use collector::MetricsCollector;
pub use health::{HealthServer, HealthServerConfig};
