//! The clock source that drives live updates.
//!
//! `SystemClock` ticks at the configured [`ClockResolution`] and broadcasts a
//! [`TickEvent`] carrying the wall-clock instant in the configured timezone.
//! Consumers re-resolve timings against that instant, so nothing downstream
//! ever reads the system clock on its own.

use crate::config::ClockResolution;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

/// One tick of the clock.
#[derive(Debug, Clone)]
pub struct TickEvent {
    /// Ticks since the clock started, starting at 1.
    pub tick_count: u64,
    /// Wall-clock time of the tick, whole seconds, in the configured timezone.
    pub timestamp: DateTime<Tz>,
}

/// Reads the wall clock in `tz`, truncated to the second.
pub fn now_in(tz: &Tz) -> DateTime<Tz> {
    let now = Utc::now().with_timezone(tz);
    now - chrono::Duration::nanoseconds(i64::from(now.timestamp_subsec_nanos()))
}

#[doc(hidden)]
pub(crate) struct SystemClock {
    resolution: ClockResolution,
    timezone: Tz,
    tick_sender: broadcast::Sender<Arc<TickEvent>>,
}

impl SystemClock {
    pub(crate) fn new(
        resolution: ClockResolution,
        timezone: Tz,
        tick_sender: broadcast::Sender<Arc<TickEvent>>,
    ) -> Self {
        Self {
            resolution,
            timezone,
            tick_sender,
        }
    }

    /// Ticks until a shutdown signal arrives.
    pub(crate) async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        let mut interval = tokio::time::interval(self.resolution.tick_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut tick_count: u64 = 0;
        debug!(interval = ?self.resolution.tick_interval(), "clock started");

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                _ = interval.tick() => {
                    tick_count += 1;
                    let tick = Arc::new(TickEvent {
                        tick_count,
                        timestamp: now_in(&self.timezone),
                    });
                    trace!("Tick #{} at {}", tick.tick_count, tick.timestamp);
                    // Errors only when nobody is subscribed.
                    self.tick_sender.send(tick).ok();
                }
            }
        }
        debug!(ticks = tick_count, "clock stopped");
    }
}
