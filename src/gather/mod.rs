//! Gather polling pipeline
//!
//! One tick runs detect → correlate → resolve → render → send against a
//! freshly fetched snapshot, then replaces the previous-snapshot cell. The
//! pieces are split so each stage stays testable with synthetic snapshots.

pub mod correlator;
pub mod detector;
pub mod notifier;
pub mod watcher;

pub use correlator::{correlate, resolve_candidates};
pub use detector::detect_changes;
pub use notifier::{render, LOBBY_CAPACITY};
pub use watcher::GatherWatcher;
