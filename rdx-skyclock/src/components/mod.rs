//! Components the engine runs on every tick.
//!
//! Watchers turn the raw tick stream into higher-level [`SystemEvent`]s.
//!
//! [`SystemEvent`]: crate::events::SystemEvent

pub mod watcher;
