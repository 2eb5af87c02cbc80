//! Error types for the Skyclock library.
//!
//! Resolver math is total over valid instants. Most failures come from loading
//! configuration and from looking events up in the catalog. The shard day
//! search is the one resolver with a failure mode.

use chrono::DateTime;
use chrono_tz::Tz;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SkyclockError>;

/// Core error type for skyclock.
#[derive(Error, Debug)]
pub enum SkyclockError {
    /// Malformed event parameters or schedule rows, detected at load time.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The config file or environment could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The shard day search ran past its iteration cap.
    #[error("No shard day found within {cap} days of {from}")]
    UnboundedSearch { from: DateTime<Tz>, cap: u32 },

    /// The event exists in the catalog but has no resolver.
    #[error("Timings for '{name}' are not supported yet")]
    UnsupportedEvent { name: String },

    /// No catalog entry matches the requested name, slug or alias.
    #[error("Unknown event: '{0}'")]
    UnknownEvent(String),
}

impl SkyclockError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        SkyclockError::Configuration(message.into())
    }
}
