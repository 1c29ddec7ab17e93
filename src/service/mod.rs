//! Service orchestration
//!
//! Wires configuration, collaborators, and background poll tasks into one
//! runnable application state.

pub mod app;

pub use app::{AppState, ServiceError};
