//! The core engine that ties configuration, the event catalog and the clock
//! together.

use crate::catalog::{EventCatalog, EventDescriptor};
use crate::components::watcher::DayWatcher;
use crate::config::SkyclockConfig;
use crate::error::Result;
use crate::events::SystemEvent;
use crate::format::{self, Rendered};
use crate::shard::ShardSchedule;
use crate::time::{self, SystemClock, TickEvent};
use crate::timings::TimingEntry;
use chrono::DateTime;
use chrono_tz::Tz;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::{error, info, trace};

/// The main Skyclock engine.
///
/// Holds the validated configuration and the event catalog, answers timing
/// queries, and drives the clock that live views re-render on. The engine is
/// cheap to clone; clones share the same catalog and channels.
#[derive(Clone)]
pub struct SkyclockEngine {
    config: Arc<SkyclockConfig>,
    catalog: Arc<EventCatalog>,
    tick_sender: broadcast::Sender<Arc<TickEvent>>,
    system_event_sender: broadcast::Sender<SystemEvent>,
    day_watcher: Arc<RwLock<DayWatcher>>,
}

// Core implementation block for internal logic.
impl SkyclockEngine {
    /// Creates a new `SkyclockEngine` from the given configuration.
    ///
    /// Validates the configuration and builds the catalog, so any malformed
    /// event parameters surface here rather than at query time.
    pub fn new(config: SkyclockConfig) -> Result<Self> {
        const CHANNEL_CAPACITY: usize = 256;
        config.validate()?;

        let shards = Arc::new(ShardSchedule::builtin()?);
        let catalog = EventCatalog::from_config(&config, shards)?;
        let (tick_sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (system_event_sender, _) = broadcast::channel(64);

        Ok(Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            tick_sender,
            system_event_sender,
            day_watcher: Arc::new(RwLock::new(DayWatcher::new())),
        })
    }

    /// Loads configuration from `path` and the environment, then builds the
    /// engine.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::new(SkyclockConfig::load(path)?)
    }

    /// Runs the engine's main loop until a shutdown signal is received.
    ///
    /// This method will:
    /// 1. Spawn the `SystemClock` task.
    /// 2. Spawn the dispatcher task that watches ticks for date changes.
    /// 3. Wait for a Ctrl+C signal to initiate a graceful shutdown.
    pub async fn run(&self) -> anyhow::Result<()> {
        info!("SkyclockEngine starting up...");
        let (shutdown_tx, _) = broadcast::channel(1);

        let clock = SystemClock::new(
            self.config.resolution.clone(),
            self.config.timezone,
            self.tick_sender.clone(),
        );
        let clock_shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move { clock.run(clock_shutdown_rx).await });

        let dispatcher = self.clone();
        let dispatcher_shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move { dispatcher.dispatcher_loop(dispatcher_shutdown_rx).await });

        info!(
            "Engine running at {:?} in {}. Press Ctrl+C to shut down.",
            self.config.resolution, self.config.timezone
        );
        tokio::signal::ctrl_c().await?;

        info!("Shutdown signal received. Broadcasting to all tasks...");
        if shutdown_tx.send(()).is_err() {
            error!("Failed to send shutdown signal. Some tasks may not terminate gracefully.");
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.system_event_sender
            .send(SystemEvent::EngineShutdown)
            .ok();
        info!("SkyclockEngine has shut down.");
        Ok(())
    }

    #[doc(hidden)]
    async fn dispatcher_loop(self, mut shutdown_rx: broadcast::Receiver<()>) {
        let mut tick_rx = self.tick_sender.subscribe();
        self.system_event_sender
            .send(SystemEvent::EngineStarted {
                timestamp: self.now(),
            })
            .ok();
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                Ok(tick) = tick_rx.recv() => {
                    trace!("Tick #{} received.", tick.tick_count);
                    self.process_tick(&tick).await;
                }
            }
        }
    }

    #[doc(hidden)]
    async fn process_tick(&self, tick: &TickEvent) -> bool {
        self.day_watcher
            .write()
            .await
            .process_tick(tick, &self.system_event_sender)
    }
}

// Public API implementation block.
impl SkyclockEngine {
    pub fn config(&self) -> &SkyclockConfig {
        &self.config
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    /// The current wall-clock instant in the configured timezone.
    pub fn now(&self) -> DateTime<Tz> {
        time::now_in(&self.config.timezone)
    }

    /// Looks up an event by name, slug or alias and resolves its timings
    /// relative to `now`.
    pub fn timings(
        &self,
        query: &str,
        now: &DateTime<Tz>,
    ) -> Result<(&EventDescriptor, Vec<TimingEntry>)> {
        let (_, event) = self.catalog.require(query)?;
        let now = now.with_timezone(&self.config.timezone);
        let entries = event.timings(&now)?;
        Ok((event, entries))
    }

    /// Renders `instant` with the configured format code.
    pub fn format(&self, instant: &DateTime<Tz>, now: &DateTime<Tz>) -> Rendered {
        self.format_with(instant, &self.config.format_code, now)
    }

    /// Renders `instant` with an explicit format code.
    pub fn format_with(&self, instant: &DateTime<Tz>, code: &str, now: &DateTime<Tz>) -> Rendered {
        format::format(instant, code, now)
    }

    /// Subscribes to the raw tick stream.
    pub fn subscribe_ticks(&self) -> broadcast::Receiver<Arc<TickEvent>> {
        self.tick_sender.subscribe()
    }

    /// Subscribes to the `SystemEvent` stream.
    pub fn subscribe_system_events(&self) -> broadcast::Receiver<SystemEvent> {
        self.system_event_sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkyclockError;
    use chrono::{NaiveDate, TimeZone};
    use chrono_tz::America::{Los_Angeles, New_York};

    fn engine() -> SkyclockEngine {
        SkyclockEngine::new(SkyclockConfig::default()).unwrap()
    }

    #[test]
    fn timings_look_up_by_alias() {
        let engine = engine();
        let now = Los_Angeles.with_ymd_and_hms(2022, 1, 1, 12, 0, 0).unwrap();
        let (event, entries) = engine.timings("eden", &now).unwrap();
        assert_eq!(event.name, "Eden Reset");
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn queries_are_resolved_in_the_configured_timezone() {
        let engine = engine();
        // 02:00 in New York is still the previous day in Los Angeles.
        let now = New_York.with_ymd_and_hms(2022, 1, 2, 2, 0, 0).unwrap();
        let (_, entries) = engine.timings("Daily Reset", &now).unwrap();
        assert_eq!(
            entries[0].instant,
            Los_Angeles.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn unknown_events_are_reported() {
        let engine = engine();
        let err = engine.timings("Moomin", &engine.now()).unwrap_err();
        assert!(matches!(err, SkyclockError::UnknownEvent(_)));
    }

    #[test]
    fn invalid_configuration_is_rejected_up_front() {
        let config = SkyclockConfig {
            format_code: "no tokens".to_string(),
            ..SkyclockConfig::default()
        };
        assert!(SkyclockEngine::new(config).is_err());
    }

    #[test]
    fn format_uses_the_configured_code() {
        let engine = engine();
        let now = Los_Angeles.with_ymd_and_hms(2022, 1, 1, 12, 0, 0).unwrap();
        let instant = now + chrono::Duration::hours(2);
        assert_eq!(engine.format(&instant, &now).display, "in 2 hours");
        assert_eq!(engine.format_with(&instant, "%t", &now).display, "2:00 PM");
    }

    #[tokio::test]
    async fn day_changes_are_broadcast() {
        let engine = engine();
        let mut events = engine.subscribe_system_events();
        let before = TickEvent {
            tick_count: 1,
            timestamp: Los_Angeles.with_ymd_and_hms(2022, 1, 1, 23, 59, 59).unwrap(),
        };
        let after = TickEvent {
            tick_count: 2,
            timestamp: Los_Angeles.with_ymd_and_hms(2022, 1, 2, 0, 0, 0).unwrap(),
        };
        assert!(!engine.process_tick(&before).await);
        assert!(engine.process_tick(&after).await);
        assert_eq!(
            events.recv().await.unwrap(),
            SystemEvent::DateChanged {
                new_date: NaiveDate::from_ymd_opt(2022, 1, 2).unwrap()
            }
        );
    }
}
