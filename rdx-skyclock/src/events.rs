//! Defines the event types broadcast by the Skyclock engine.
//!
//! Ticks travel on their own channel as `Arc<TickEvent>`; everything else a
//! subscriber might care about is a [`SystemEvent`].

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

/// Events related to the lifecycle of the engine and the civil calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemEvent {
    /// Fired once when the engine's `run` loop begins.
    EngineStarted { timestamp: DateTime<Tz> },
    /// Fired once when the engine's `run` loop is about to exit.
    EngineShutdown,
    /// Fired when the civil date in the configured timezone changes. Daily
    /// resets and shard days roll over at this point.
    DateChanged { new_date: NaiveDate },
}
