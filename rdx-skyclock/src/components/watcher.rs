//! Defines watchers that react to the tick stream to produce higher-level events.

use crate::events::SystemEvent;
use crate::time::TickEvent;
use chrono::NaiveDate;
use tokio::sync::broadcast;
use tracing::info;

/// Watches the clock for civil date changes.
#[doc(hidden)]
pub(crate) struct DayWatcher {
    last_known_date: Option<NaiveDate>,
}

impl DayWatcher {
    /// Creates a new `DayWatcher`. The first tick only records its date.
    pub(crate) fn new() -> Self {
        Self {
            last_known_date: None,
        }
    }

    /// Processes a tick and fires `DateChanged` if the date has rolled over.
    /// Returns `true` if an event was sent.
    pub(crate) fn process_tick(
        &mut self,
        tick: &TickEvent,
        system_event_sender: &broadcast::Sender<SystemEvent>,
    ) -> bool {
        let current_date = tick.timestamp.date_naive();
        match self.last_known_date.replace(current_date) {
            Some(previous) if previous != current_date => {
                info!("Date changed from {} to {}", previous, current_date);
                system_event_sender
                    .send(SystemEvent::DateChanged {
                        new_date: current_date,
                    })
                    .ok();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Los_Angeles;

    fn tick(tick_count: u64, d: u32, h: u32, m: u32, s: u32) -> TickEvent {
        TickEvent {
            tick_count,
            timestamp: Los_Angeles.with_ymd_and_hms(2022, 1, d, h, m, s).unwrap(),
        }
    }

    #[test]
    fn fires_once_at_midnight() {
        let (tx, mut rx) = broadcast::channel(8);
        let mut watcher = DayWatcher::new();

        assert!(!watcher.process_tick(&tick(1, 1, 23, 59, 58), &tx));
        assert!(!watcher.process_tick(&tick(2, 1, 23, 59, 59), &tx));
        assert!(watcher.process_tick(&tick(3, 2, 0, 0, 0), &tx));
        assert!(!watcher.process_tick(&tick(4, 2, 0, 0, 1), &tx));

        assert_eq!(
            rx.try_recv().unwrap(),
            SystemEvent::DateChanged {
                new_date: NaiveDate::from_ymd_opt(2022, 1, 2).unwrap()
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn first_tick_never_fires() {
        let (tx, _rx) = broadcast::channel(8);
        let mut watcher = DayWatcher::new();
        assert!(!watcher.process_tick(&tick(1, 5, 0, 0, 0), &tx));
    }
}
