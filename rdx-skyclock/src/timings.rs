//! Turns resolver output into labelled timing entries for display.

use crate::catalog::{EventDescriptor, Recurrence};
use crate::error::{Result, SkyclockError};
use crate::format::{self, Rendered};
use crate::resolvers::fixed_cycle;
use crate::shard::ShardDay;
use chrono::DateTime;
use chrono_tz::Tz;

/// One labelled instant for the selected event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingEntry {
    pub label: String,
    pub instant: DateTime<Tz>,
    pub description: Option<String>,
}

impl TimingEntry {
    fn new(label: impl Into<String>, instant: DateTime<Tz>) -> Self {
        Self {
            label: label.into(),
            instant,
            description: None,
        }
    }

    fn describe(mut self, description: Option<&str>) -> Self {
        self.description = description.map(str::to_string);
        self
    }

    /// Renders the entry's instant under `code`.
    pub fn render(&self, code: &str, now: &DateTime<Tz>) -> Rendered {
        format::format(&self.instant, code, now)
    }
}

impl EventDescriptor {
    /// Resolves this event's timing entries relative to `now`.
    pub fn timings(&self, now: &DateTime<Tz>) -> Result<Vec<TimingEntry>> {
        match &self.recurrence {
            Recurrence::FixedCycle(cycle) => {
                let bounds = fixed_cycle::resolve(now, *cycle);
                Ok(vec![
                    TimingEntry::new("Last reset", bounds.previous),
                    TimingEntry::new("Next reset", bounds.next),
                ])
            }
            Recurrence::PeriodicWindow(schedule) => {
                let window = schedule.resolve(now);
                let params = schedule.params();
                let mut entries = vec![TimingEntry::new("Next start", window.next_start)
                    .describe(params.started_description.as_deref())];
                if let Some(active_start) = window.next_active_start {
                    entries.push(
                        TimingEntry::new("Next active", active_start)
                            .describe(params.active_description.as_deref()),
                    );
                }
                if let Some(active_end) = window.next_active_end {
                    entries.push(TimingEntry::new("Next active end", active_end));
                }
                entries.push(TimingEntry::new("Next end", window.next_end));
                entries.push(TimingEntry::new("Previous start", window.prev_start));
                entries.push(TimingEntry::new("Previous end", window.prev_end));
                Ok(entries)
            }
            Recurrence::BiweeklyCounter(params) => {
                let visit = params.resolve(now);
                Ok(vec![
                    TimingEntry::new(format!("#{} arrives", visit.next_index), visit.next_start),
                    TimingEntry::new(format!("#{} leaves", visit.next_index), visit.next_end),
                    TimingEntry::new(format!("#{} arrived", visit.prev_index), visit.prev_start),
                    TimingEntry::new(format!("#{} left", visit.prev_index), visit.prev_end),
                ])
            }
            Recurrence::RotatingPhaseSchedule(schedule) => {
                let day = schedule.find_next_shard_day(now)?;
                Ok(shard_entries(&day, now))
            }
            Recurrence::Unimplemented => Err(SkyclockError::UnsupportedEvent {
                name: self.name.clone(),
            }),
        }
    }
}

fn shard_entries(day: &ShardDay, now: &DateTime<Tz>) -> Vec<TimingEntry> {
    let color = if day.is_red { "Red" } else { "Black" };
    let mut summary = format!("{} shard in {} ({})", color, day.realm, day.map);
    if let Some(reward) = day.reward {
        summary.push_str(&format!(", reward {}", reward));
    }

    let mut entries = vec![TimingEntry::new("Shard day", day.day_start).describe(Some(&summary))];
    for phase in day.phases().iter().filter(|phase| phase.end >= *now) {
        let number = phase.index + 1;
        entries.push(TimingEntry::new(format!("Phase {} starts", number), phase.start));
        entries.push(
            TimingEntry::new(format!("Phase {} lands", number), phase.land)
                .describe(Some(day.map.as_str())),
        );
        entries.push(TimingEntry::new(format!("Phase {} ends", number), phase.end));
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EventCatalog;
    use crate::config::SkyclockConfig;
    use crate::shard::ShardSchedule;
    use chrono::TimeZone;
    use chrono_tz::America::Los_Angeles;
    use std::sync::Arc;

    fn catalog() -> EventCatalog {
        let shards = Arc::new(ShardSchedule::builtin().unwrap());
        EventCatalog::from_config(&SkyclockConfig::default(), shards).unwrap()
    }

    fn now() -> DateTime<Tz> {
        Los_Angeles.with_ymd_and_hms(2022, 1, 1, 12, 0, 0).unwrap()
    }

    fn labels(entries: &[TimingEntry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.label.as_str()).collect()
    }

    #[test]
    fn resets_have_two_entries() {
        let catalog = catalog();
        let (_, daily) = catalog.find("Daily Reset").unwrap();
        let entries = daily.timings(&now()).unwrap();
        assert_eq!(labels(&entries), vec!["Last reset", "Next reset"]);
    }

    #[test]
    fn geyser_has_five_entries_with_descriptions() {
        let catalog = catalog();
        let (_, geyser) = catalog.find("geyser").unwrap();
        let entries = geyser.timings(&now()).unwrap();
        assert_eq!(
            labels(&entries),
            vec!["Next start", "Next active", "Next end", "Previous start", "Previous end"]
        );
        assert_eq!(entries[0].instant, now());
        assert_eq!(entries[0].description.as_deref(), Some("Geyser is about to erupt"));
        assert_eq!(entries[1].description.as_deref(), Some("Geyser is erupting"));
    }

    #[test]
    fn traveling_spirit_labels_carry_the_index() {
        let catalog = catalog();
        let (_, ts) = catalog.find("TS").unwrap();
        let entries = ts.timings(&Los_Angeles.with_ymd_and_hms(2022, 1, 12, 0, 0, 0).unwrap()).unwrap();
        assert_eq!(
            labels(&entries),
            vec!["#53 arrives", "#53 leaves", "#52 arrived", "#52 left"]
        );
    }

    #[test]
    fn shard_lists_remaining_phases() {
        let catalog = catalog();
        let (_, shard) = catalog.find("shard").unwrap();
        let entries = shard.timings(&now()).unwrap();
        // Phase 1 of the 1st ended at 11:40; phases 2 and 3 remain.
        assert_eq!(entries.len(), 7);
        assert_eq!(entries[0].label, "Shard day");
        assert_eq!(
            entries[0].description.as_deref(),
            Some("Red shard in Daylight Prairie (Cave), reward 2")
        );
        assert_eq!(entries[1].label, "Phase 2 starts");
        assert_eq!(entries[1].instant, Los_Angeles.with_ymd_and_hms(2022, 1, 1, 13, 40, 0).unwrap());
    }

    #[test]
    fn one_time_events_are_unsupported() {
        let catalog = catalog();
        let (_, special) = catalog.find("Special Events").unwrap();
        let err = special.timings(&now()).unwrap_err();
        assert!(matches!(err, SkyclockError::UnsupportedEvent { .. }));
    }

    #[test]
    fn entries_render_under_the_format_code() {
        let catalog = catalog();
        let (_, daily) = catalog.find("Daily Reset").unwrap();
        let entries = daily.timings(&now()).unwrap();
        let rendered = entries[1].render("%R", &now());
        assert_eq!(rendered.display, "in 12 hours");
        assert_eq!(rendered.markup, format!("<t:{}:R>", entries[1].instant.timestamp()));
    }
}
