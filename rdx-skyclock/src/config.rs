//! Defines all configuration structures for Skyclock.
//!
//! These structs are deserialized with `serde` from an optional TOML file and
//! `SKYCLOCK_`-prefixed environment variables via the `config` crate.
//! Everything has a built-in default, so an empty configuration describes
//! the live game. Configuration is loaded and validated once at startup;
//! resolvers only ever see validated values.

use crate::catalog::Category;
use crate::error::{Result, SkyclockError};
use crate::format::{self, DEFAULT_FORMAT_CODE};
use crate::resolvers::periodic::{self, PeriodicSchedule};
use crate::resolvers::{BiweeklyParams, PeriodicWindowParams};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// The top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SkyclockConfig {
    /// The civil timezone every event is anchored to. Uses IANA names
    /// (e.g. "America/Los_Angeles").
    pub timezone: Tz,

    /// The user's preferred format code, e.g. `"%t (%R)"`.
    pub format_code: String,

    /// How often the clock source ticks.
    pub resolution: ClockResolution,

    /// Anchor for the numbered biweekly Traveling Spirit visits.
    pub traveling_spirit: BiweeklyParams,

    /// Hourly windows. Built-in events may be overridden by name; any other
    /// name adds a new event to the catalog.
    pub periodic_events: Vec<PeriodicEventConfig>,
}

/// Defines the tick speed of the clock source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockResolution {
    /// One tick per second.
    Second,
    /// A user-defined speed in ticks per second.
    Custom { ticks_per_second: u64 },
}

impl ClockResolution {
    pub fn tick_interval(&self) -> Duration {
        match self {
            ClockResolution::Second => Duration::from_secs(1),
            ClockResolution::Custom { ticks_per_second } => {
                Duration::from_secs(1) / (*ticks_per_second).max(1) as u32
            }
        }
    }
}

/// One periodic event as written in config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PeriodicEventConfig {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default = "default_periodic_category")]
    pub category: Category,
    #[serde(flatten)]
    pub params: PeriodicWindowParams,
}

// --- Default value functions for serde ---

fn default_timezone() -> Tz {
    chrono_tz::America::Los_Angeles
}

fn default_periodic_category() -> Category {
    Category::SocialLight
}

fn default_periodic_events() -> Vec<PeriodicEventConfig> {
    periodic::builtin_events()
        .into_iter()
        .map(|(name, params)| PeriodicEventConfig {
            name: name.to_string(),
            aliases: Vec::new(),
            category: if name == "Aurora Concert" {
                Category::Repeating
            } else {
                Category::SocialLight
            },
            params,
        })
        .collect()
}

impl Default for SkyclockConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            format_code: DEFAULT_FORMAT_CODE.to_string(),
            resolution: ClockResolution::Second,
            traveling_spirit: BiweeklyParams::default(),
            periodic_events: default_periodic_events(),
        }
    }
}

impl SkyclockConfig {
    /// Loads configuration from `path` (if given) layered under
    /// `SKYCLOCK_*` environment variables, then validates it.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(Environment::with_prefix("SKYCLOCK"));

        let config: SkyclockConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        debug!(
            timezone = %config.timezone,
            format_code = %config.format_code,
            periodic_events = config.periodic_events.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Parses configuration from a TOML string. Mostly useful in tests.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: SkyclockConfig = Config::builder()
            .add_source(File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Fails fast on anything that would make a resolver produce wrong
    /// instants.
    pub fn validate(&self) -> Result<()> {
        if !format::parse(&self.format_code)
            .iter()
            .any(|piece| matches!(piece, format::Piece::Token(_)))
        {
            return Err(SkyclockError::config(format!(
                "format code '{}' contains no timestamp token",
                self.format_code
            )));
        }
        if let ClockResolution::Custom { ticks_per_second } = self.resolution {
            if !(1..=1000).contains(&ticks_per_second) {
                return Err(SkyclockError::config(format!(
                    "clock must tick between 1 and 1000 times per second, got {}",
                    ticks_per_second
                )));
            }
        }
        self.traveling_spirit.validate()?;

        let mut seen = HashSet::new();
        for event in &self.periodic_events {
            if !seen.insert(event.name.to_lowercase()) {
                return Err(SkyclockError::config(format!(
                    "periodic event '{}' is defined twice",
                    event.name
                )));
            }
            PeriodicSchedule::new(&event.name, event.params.clone())?;
        }
        Ok(())
    }

    /// Looks up a periodic event by name.
    pub fn periodic_event(&self, name: &str) -> Option<&PeriodicEventConfig> {
        self.periodic_events
            .iter()
            .find(|event| event.name.eq_ignore_ascii_case(name))
    }
}
