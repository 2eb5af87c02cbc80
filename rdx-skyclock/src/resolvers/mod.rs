//! Recurrence resolvers.
//!
//! Each resolver is a pure function of a reference instant and its own
//! parameters. Nothing here reads the clock; callers pass "now" in.

pub mod biweekly;
pub mod fixed_cycle;
pub mod periodic;

pub use biweekly::{BiweeklyOccurrence, BiweeklyParams};
pub use fixed_cycle::{Cycle, CycleBounds};
pub use periodic::{PeriodicSchedule, PeriodicWindow, PeriodicWindowParams};
