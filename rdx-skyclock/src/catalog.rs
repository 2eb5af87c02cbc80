//! The catalog of events a user can pick from.
//!
//! Each entry pairs a display name and aliases with the recurrence that
//! produces its timings. The catalog is assembled once from validated
//! configuration and never changes afterwards.

use crate::common::EventId;
use crate::config::SkyclockConfig;
use crate::error::{Result, SkyclockError};
use crate::resolvers::periodic;
use crate::resolvers::{BiweeklyParams, Cycle, PeriodicSchedule, PeriodicWindowParams};
use crate::shard::ShardSchedule;
use serde::Deserialize;
use slotmap::SlotMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// How an event is grouped in the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// A single reset instant per cycle.
    Resets,
    /// Start and end times, several times a day or week.
    Repeating,
    /// Repeating events that give out light.
    SocialLight,
    /// Announced events that only happen once.
    OneTime,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Resets => "Resets",
            Category::Repeating => "Repeating",
            Category::SocialLight => "Social Light",
            Category::OneTime => "One Time",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The recurrence shape behind an event, with its parameters.
#[derive(Debug, Clone)]
pub enum Recurrence {
    FixedCycle(Cycle),
    PeriodicWindow(PeriodicSchedule),
    BiweeklyCounter(BiweeklyParams),
    RotatingPhaseSchedule(Arc<ShardSchedule>),
    /// Declared in the catalog but without a resolver.
    Unimplemented,
}

impl Recurrence {
    pub fn kind(&self) -> &'static str {
        match self {
            Recurrence::FixedCycle(_) => "fixed cycle",
            Recurrence::PeriodicWindow(_) => "periodic window",
            Recurrence::BiweeklyCounter(_) => "biweekly counter",
            Recurrence::RotatingPhaseSchedule(_) => "rotating phase schedule",
            Recurrence::Unimplemented => "unimplemented",
        }
    }
}

/// A selectable event.
#[derive(Debug, Clone)]
pub struct EventDescriptor {
    pub name: String,
    pub aliases: Vec<String>,
    pub category: Category,
    pub recurrence: Recurrence,
}

impl EventDescriptor {
    /// URL-style name: lowercase with every space turned into `-`.
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    /// `category/slug`, e.g. `social-light/sanctuary-geyser`.
    pub fn full_slug(&self) -> String {
        format!("{}/{}", slugify(self.category.label()), self.slug())
    }

    fn matches_exactly(&self, query: &str) -> bool {
        self.name.eq_ignore_ascii_case(query)
            || self.slug() == query.to_lowercase()
            || self.full_slug() == query.to_lowercase()
            || self
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(query))
    }

    /// Lower is better; `None` when the query does not appear at all.
    fn search_rank(&self, query: &str) -> Option<usize> {
        let query = query.to_lowercase();
        let name = self.name.to_lowercase();
        if name == query {
            return Some(0);
        }
        if name.starts_with(&query) {
            return Some(1);
        }
        if self
            .aliases
            .iter()
            .any(|alias| alias.to_lowercase().starts_with(&query))
        {
            return Some(2);
        }
        if name.contains(&query) {
            return Some(3);
        }
        if self
            .aliases
            .iter()
            .any(|alias| alias.to_lowercase().contains(&query))
        {
            return Some(4);
        }
        None
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|name| name.to_string()).collect()
}

fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// All selectable events, in display order.
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    events: SlotMap<EventId, EventDescriptor>,
}

impl EventCatalog {
    /// Builds the catalog from validated configuration.
    ///
    /// Periodic events listed in `config.periodic_events` override the
    /// built-in parameters of the same name; built-ins missing from the list
    /// keep their defaults, and any other names are appended.
    pub fn from_config(config: &SkyclockConfig, shards: Arc<ShardSchedule>) -> Result<Self> {
        let mut catalog = EventCatalog::default();

        let periodic = |name: &str, builtin: PeriodicWindowParams| -> Result<Recurrence> {
            let params = config
                .periodic_event(name)
                .map(|event| event.params.clone())
                .unwrap_or(builtin);
            Ok(Recurrence::PeriodicWindow(PeriodicSchedule::new(name, params)?))
        };

        let builtins: Vec<(Category, &str, Vec<String>, Recurrence)> = vec![
            (
                Category::Resets,
                "Daily Reset",
                names(&["Reset", "Daily"]),
                Recurrence::FixedCycle(Cycle::Day),
            ),
            (
                Category::Resets,
                "Eden Reset",
                names(&["Eden", "Weekly Reset"]),
                Recurrence::FixedCycle(Cycle::Week),
            ),
            (
                Category::Repeating,
                "Traveling Spirits",
                names(&["TS", "Traveling Spirit"]),
                Recurrence::BiweeklyCounter(config.traveling_spirit.clone()),
            ),
            (
                Category::Repeating,
                "Aurora Concert",
                names(&["Aurora", "Concert"]),
                periodic("Aurora Concert", periodic::aurora_concert())?,
            ),
            (
                Category::Repeating,
                "Shattering Shard",
                names(&["Shard", "Shards", "Eruption"]),
                Recurrence::RotatingPhaseSchedule(shards),
            ),
            (
                Category::SocialLight,
                "Sanctuary Geyser",
                names(&["Geyser", "Polluted Geyser"]),
                periodic("Sanctuary Geyser", periodic::sanctuary_geyser())?,
            ),
            (
                Category::SocialLight,
                "Forest Grandma Dinner",
                names(&["Grandma", "Dinner"]),
                periodic("Forest Grandma Dinner", periodic::forest_grandma_dinner())?,
            ),
            (
                Category::SocialLight,
                "Sanctuary Turtle",
                names(&["Turtle"]),
                periodic("Sanctuary Turtle", periodic::sanctuary_turtle())?,
            ),
            (
                Category::OneTime,
                "Special Events",
                names(&["Days of", "Seasonal Event"]),
                Recurrence::Unimplemented,
            ),
        ];

        for (category, name, aliases, recurrence) in builtins {
            let aliases = match config.periodic_event(name) {
                Some(event) => [aliases, event.aliases.clone()].concat(),
                None => aliases,
            };
            catalog.insert(EventDescriptor {
                name: name.to_string(),
                aliases,
                category,
                recurrence,
            });
        }

        for event in &config.periodic_events {
            if catalog.find(&event.name).is_some() {
                continue;
            }
            catalog.insert(EventDescriptor {
                name: event.name.clone(),
                aliases: event.aliases.clone(),
                category: event.category,
                recurrence: Recurrence::PeriodicWindow(PeriodicSchedule::new(
                    &event.name,
                    event.params.clone(),
                )?),
            });
        }

        debug!(events = catalog.len(), "event catalog built");
        Ok(catalog)
    }

    fn insert(&mut self, event: EventDescriptor) -> EventId {
        self.events.insert(event)
    }

    pub fn get(&self, id: EventId) -> Option<&EventDescriptor> {
        self.events.get(id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventId, &EventDescriptor)> {
        self.events.iter()
    }

    /// Exact, case-insensitive lookup by name, slug, full slug or alias.
    pub fn find(&self, query: &str) -> Option<(EventId, &EventDescriptor)> {
        let query = query.trim();
        self.events
            .iter()
            .find(|(_, event)| event.matches_exactly(query))
    }

    /// Like [`find`](Self::find), but errors on a miss.
    pub fn require(&self, query: &str) -> Result<(EventId, &EventDescriptor)> {
        self.find(query)
            .ok_or_else(|| SkyclockError::UnknownEvent(query.to_string()))
    }

    /// Events whose name or aliases contain `query`, best matches first.
    /// An empty query lists everything.
    pub fn search(&self, query: &str) -> Vec<(EventId, &EventDescriptor)> {
        let query = query.trim();
        if query.is_empty() {
            return self.iter().collect();
        }
        let mut hits: Vec<(usize, EventId, &EventDescriptor)> = self
            .events
            .iter()
            .filter_map(|(id, event)| event.search_rank(query).map(|rank| (rank, id, event)))
            .collect();
        hits.sort_by_key(|(rank, _, _)| *rank);
        hits.into_iter().map(|(_, id, event)| (id, event)).collect()
    }
}
