//! # Skyclock
//!
//! A timing engine for the recurring events of *Sky: Children of the Light*.
//!
//! Every event in the game repeats on one of a handful of shapes, always
//! anchored to civil time in `America/Los_Angeles`. Skyclock resolves "what
//! was the last occurrence and when is the next one" for each of them, and
//! renders the answer both as chat timestamp markup and as readable text.
//!
//! ## Core Concepts
//!
//! - **Resolvers**: pure functions from "now" to instants. Fixed cycles
//!   (daily and weekly resets), periodic windows (hourly social events),
//!   a biweekly counter (Traveling Spirits) and the rotating shard table.
//! - **Catalog**: the selectable events, each pairing names and aliases
//!   with its recurrence. Built once from validated configuration.
//! - **Formatter**: `%`-prefixed format codes become `<t:EPOCH:X>` tags
//!   and human-readable renderings.
//! - **Engine**: owns the catalog and a `SystemClock` that ticks so live
//!   views can re-render, and broadcasts a `DateChanged` event at midnight.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use skyclock::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let engine = SkyclockEngine::new(SkyclockConfig::default())?;
//!     let now = engine.now();
//!
//!     let (event, entries) = engine.timings("geyser", &now)?;
//!     println!("{}", event.name);
//!     for entry in entries {
//!         let rendered = engine.format(&entry.instant, &now);
//!         println!("  {:<16} {}  {}", entry.label, rendered.display, rendered.markup);
//!     }
//!     Ok(())
//! }
//! ```

pub const ENGINE_NAME: &str = "Skyclock";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Declare all the modules in the crate.
pub mod catalog;
pub mod civil;
pub mod common;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod format;
pub mod resolvers;
pub mod shard;
pub mod span;
pub mod time;
pub mod timings;

pub use common::prelude;
