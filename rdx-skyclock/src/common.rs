//! Contains common, primitive types and a prelude for easy importing.
//!
//! Catalog entries are stored in a `SlotMap`, so callers hold an `EventId`
//! rather than a reference or an index into a `Vec`.

use slotmap::new_key_type;

/// A prelude module for convenient importing of the most common Skyclock types.
///
/// # Example
/// ```
/// use skyclock::prelude::*;
/// ```
pub mod prelude {
    pub use super::EventId;
    pub use crate::catalog::{Category, EventCatalog, EventDescriptor, Recurrence};
    pub use crate::config::{ClockResolution, SkyclockConfig};
    pub use crate::engine::SkyclockEngine;
    pub use crate::error::{Result, SkyclockError};
    pub use crate::events::SystemEvent;
    pub use crate::format::{Rendered, FORMAT_PRESETS};
    pub use crate::span::Span;
    pub use crate::time::TickEvent;
    pub use crate::timings::TimingEntry;
}

new_key_type! {
    /// Identifies an event in the [`EventCatalog`](crate::catalog::EventCatalog).
    ///
    /// Keys are handed out once when the catalog is built and stay valid for
    /// the life of that catalog.
    pub struct EventId;
}
