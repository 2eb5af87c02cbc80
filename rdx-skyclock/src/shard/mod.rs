//! The Shattering Shard schedule.
//!
//! Shards rotate on a five-row table. Each calendar day picks a row from its
//! day-of-month parity (red or black shard) and a realm from a five-day
//! cycle; the row decides which two weekdays are blacked out, when the first
//! of the day's three phases begins and how far apart the phases are.

mod phase;

pub use phase::{ShardPhase, SEARCH_CAP_DAYS};

use crate::civil;
use crate::error::{Result, SkyclockError};
use crate::span::Span;
use chrono::{DateTime, Datelike, NaiveDate, Weekday};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::fmt;

/// Time from a phase's start to its end.
pub const PHASE_LENGTH: Span = Span::hours(4);

const BLACK_SHARD_INTERVAL: Span = Span::hours(8);
const RED_SHARD_INTERVAL: Span = Span::hours(6);
const ROW_COUNT: usize = 5;
const REALM_COUNT: usize = 5;

/// The five realms, in rotation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Realm {
    Prairie,
    Forest,
    Valley,
    Wasteland,
    Vault,
}

impl Realm {
    pub const ALL: [Realm; REALM_COUNT] = [
        Realm::Prairie,
        Realm::Forest,
        Realm::Valley,
        Realm::Wasteland,
        Realm::Vault,
    ];

    pub fn full_name(self) -> &'static str {
        match self {
            Realm::Prairie => "Daylight Prairie",
            Realm::Forest => "Hidden Forest",
            Realm::Valley => "Valley Of Triumph",
            Realm::Wasteland => "Golden Wasteland",
            Realm::Vault => "Vault Of Knowledge",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Realm::Prairie => "Prairie",
            Realm::Forest => "Forest",
            Realm::Valley => "Valley",
            Realm::Wasteland => "Wasteland",
            Realm::Vault => "Vault",
        }
    }
}

impl fmt::Display for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

/// One row of the shard table, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ShardRow {
    pub no_shard_weekdays: Vec<Weekday>,
    pub offset: Span,
    pub interval: Span,
    /// One map per realm, in [`Realm::ALL`] order.
    pub maps: Vec<String>,
    pub default_reward: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
struct ValidRow {
    no_shard_weekdays: [Weekday; 2],
    offset: Span,
    interval: Span,
    maps: [String; REALM_COUNT],
    default_reward: Option<f64>,
}

/// Everything known about shards on one civil day.
#[derive(Debug, Clone, PartialEq)]
pub struct ShardDay {
    pub date: NaiveDate,
    pub day_start: DateTime<Tz>,
    pub is_red: bool,
    pub has_shard: bool,
    pub offset: Span,
    pub interval: Span,
    /// End of the third and final phase.
    pub last_end: DateTime<Tz>,
    pub realm: Realm,
    pub map: String,
    /// Only defined on red shard days.
    pub reward: Option<f64>,
}

/// The validated shard table plus the per-map reward overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct ShardSchedule {
    rows: Vec<ValidRow>,
    reward_overrides: HashMap<String, f64>,
}

impl ShardSchedule {
    /// Validates a table of exactly five rows.
    pub fn new(rows: Vec<ShardRow>, reward_overrides: HashMap<String, f64>) -> Result<Self> {
        if rows.len() != ROW_COUNT {
            return Err(SkyclockError::config(format!(
                "shard table needs {} rows, got {}",
                ROW_COUNT,
                rows.len()
            )));
        }
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| validate_row(index, row))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            rows,
            reward_overrides,
        })
    }

    /// The table the game has used since shards were introduced.
    pub fn builtin() -> Result<Self> {
        let row = |no_shard: [Weekday; 2],
                   offset: Span,
                   interval: Span,
                   maps: [&str; REALM_COUNT],
                   default_reward: Option<f64>| ShardRow {
            no_shard_weekdays: no_shard.to_vec(),
            offset,
            interval,
            maps: maps.iter().map(|map| map.to_string()).collect(),
            default_reward,
        };

        let rows = vec![
            row(
                [Weekday::Sat, Weekday::Sun],
                Span::hm(1, 50),
                BLACK_SHARD_INTERVAL,
                ["Butterfly Field", "Forest Brook", "Ice Rink", "Broken Temple", "Starlight Desert"],
                None,
            ),
            row(
                [Weekday::Sun, Weekday::Mon],
                Span::hm(2, 10),
                BLACK_SHARD_INTERVAL,
                ["Village Islands", "Boneyard", "Ice Rink", "Battlefield", "Starlight Desert"],
                None,
            ),
            row(
                [Weekday::Mon, Weekday::Tue],
                Span::hm(7, 40),
                RED_SHARD_INTERVAL,
                ["Cave", "Forest Garden", "Village of Dreams", "Graveyard", "Jellyfish Cove"],
                Some(2.0),
            ),
            row(
                [Weekday::Tue, Weekday::Wed],
                Span::hm(2, 20),
                RED_SHARD_INTERVAL,
                ["Bird Nest", "Treehouse", "Village of Dreams", "Crabfield", "Jellyfish Cove"],
                Some(2.5),
            ),
            row(
                [Weekday::Wed, Weekday::Thu],
                Span::hm(3, 30),
                RED_SHARD_INTERVAL,
                ["Sanctuary Island", "Elevated Clearing", "Hermit valley", "Forgotten Ark", "Jellyfish Cove"],
                Some(3.5),
            ),
        ];

        let overrides = [
            ("Forest Garden", 2.5),
            ("Village of Dreams", 2.5),
            ("Treehouse", 3.5),
            ("Jellyfish Cove", 3.5),
        ]
        .into_iter()
        .map(|(map, reward)| (map.to_string(), reward))
        .collect();

        Self::new(rows, overrides)
    }

    /// Classifies the civil day containing `instant`.
    pub fn classify_day(&self, instant: &DateTime<Tz>) -> ShardDay {
        let day_start = civil::start_of_day(instant);
        let date = day_start.date_naive();
        let day_of_month = date.day() as usize;

        let is_red = day_of_month % 2 == 1;
        let realm = Realm::ALL[(day_of_month - 1) % REALM_COUNT];
        let row_index = if is_red {
            ((day_of_month - 1) / 2) % 3 + 2
        } else {
            (day_of_month / 2) % 2
        };
        let row = &self.rows[row_index];

        let map = row.maps[(day_of_month - 1) % REALM_COUNT].clone();
        let reward = if is_red {
            self.reward_overrides
                .get(&map)
                .copied()
                .or(row.default_reward)
        } else {
            None
        };
        let last_end = (row.offset + row.interval * 2 + PHASE_LENGTH).add_to(&day_start);

        ShardDay {
            date,
            day_start,
            is_red,
            has_shard: !row.no_shard_weekdays.contains(&date.weekday()),
            offset: row.offset,
            interval: row.interval,
            last_end,
            realm,
            map,
            reward,
        }
    }
}

fn validate_row(index: usize, row: ShardRow) -> Result<ValidRow> {
    let no_shard_weekdays: [Weekday; 2] = row
        .no_shard_weekdays
        .try_into()
        .map_err(|days: Vec<Weekday>| {
            SkyclockError::config(format!(
                "shard row {} must black out exactly 2 weekdays, got {}",
                index,
                days.len()
            ))
        })?;
    if no_shard_weekdays[0] == no_shard_weekdays[1] {
        return Err(SkyclockError::config(format!(
            "shard row {} blacks out {:?} twice",
            index, no_shard_weekdays[0]
        )));
    }

    let maps: [String; REALM_COUNT] = row.maps.try_into().map_err(|maps: Vec<String>| {
        SkyclockError::config(format!(
            "shard row {} needs {} maps, got {}",
            index,
            REALM_COUNT,
            maps.len()
        ))
    })?;
    if let Some(blank) = maps.iter().position(|map| map.trim().is_empty()) {
        return Err(SkyclockError::config(format!(
            "shard row {} has an empty map name for {}",
            index,
            Realm::ALL[blank]
        )));
    }

    if row.offset.is_negative() || row.interval.total_seconds() <= 0 {
        return Err(SkyclockError::config(format!(
            "shard row {} needs a non-negative offset and a positive interval",
            index
        )));
    }
    if row.interval.total_seconds() < PHASE_LENGTH.total_seconds() {
        return Err(SkyclockError::config(format!(
            "shard row {} interval {} is shorter than a phase",
            index, row.interval
        )));
    }

    Ok(ValidRow {
        no_shard_weekdays,
        offset: row.offset,
        interval: row.interval,
        maps,
        default_reward: row.default_reward,
    })
}

#[cfg(test)]
impl ShardSchedule {
    /// Builds a table without validation so tests can feed it broken rows.
    pub(crate) fn unchecked(rows: Vec<(Vec<Weekday>, Span, Span)>) -> Self {
        let rows = rows
            .into_iter()
            .map(|(no_shard, offset, interval)| ValidRow {
                no_shard_weekdays: [no_shard[0], no_shard[1]],
                offset,
                interval,
                maps: std::array::from_fn(|i| format!("Map {}", i)),
                default_reward: None,
            })
            .collect();
        Self {
            rows,
            reward_overrides: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Los_Angeles;

    fn day(d: u32) -> DateTime<Tz> {
        Los_Angeles.with_ymd_and_hms(2022, 1, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn ten_days_follow_the_documented_rotation() {
        let schedule = ShardSchedule::builtin().unwrap();
        let expected = [
            (true, Realm::Prairie, "Cave", true, Some(2.0)),
            (false, Realm::Forest, "Boneyard", false, None),
            (true, Realm::Valley, "Village of Dreams", true, Some(2.5)),
            (false, Realm::Wasteland, "Broken Temple", true, None),
            (true, Realm::Vault, "Jellyfish Cove", false, Some(3.5)),
            (false, Realm::Prairie, "Village Islands", true, None),
            (true, Realm::Forest, "Forest Garden", true, Some(2.5)),
            (false, Realm::Valley, "Ice Rink", false, None),
            (true, Realm::Wasteland, "Crabfield", true, Some(2.5)),
            (false, Realm::Vault, "Starlight Desert", false, None),
        ];
        for (offset, (is_red, realm, map, has_shard, reward)) in expected.iter().enumerate() {
            let info = schedule.classify_day(&day(offset as u32 + 1));
            assert_eq!(info.is_red, *is_red, "day {}", offset + 1);
            assert_eq!(info.realm, *realm, "day {}", offset + 1);
            assert_eq!(info.map, *map, "day {}", offset + 1);
            assert_eq!(info.has_shard, *has_shard, "day {}", offset + 1);
            assert_eq!(info.reward, *reward, "day {}", offset + 1);
        }
    }

    #[test]
    fn reward_only_on_red_days() {
        let schedule = ShardSchedule::builtin().unwrap();
        for d in 1..=31 {
            let info = schedule.classify_day(&day(d));
            assert_eq!(info.reward.is_some(), info.is_red, "day {}", d);
        }
    }

    #[test]
    fn last_end_is_three_phases_after_the_offset() {
        let schedule = ShardSchedule::builtin().unwrap();
        let info = schedule.classify_day(&day(1));
        assert_eq!(info.day_start, Los_Angeles.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(info.last_end, Los_Angeles.with_ymd_and_hms(2022, 1, 1, 23, 40, 0).unwrap());

        let info = schedule.classify_day(&day(4));
        assert_eq!(info.last_end, Los_Angeles.with_ymd_and_hms(2022, 1, 4, 21, 50, 0).unwrap());
    }

    #[test]
    fn rejects_row_with_missing_realms() {
        let mut rows: Vec<ShardRow> = (0..5)
            .map(|_| ShardRow {
                no_shard_weekdays: vec![Weekday::Sat, Weekday::Sun],
                offset: Span::hours(1),
                interval: Span::hours(6),
                maps: (0..5).map(|i| format!("Map {}", i)).collect(),
                default_reward: None,
            })
            .collect();
        assert!(ShardSchedule::new(rows.clone(), HashMap::new()).is_ok());

        rows[3].maps.pop();
        let err = ShardSchedule::new(rows, HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("needs 5 maps"));
    }

    #[test]
    fn rejects_wrong_row_count_and_blackouts() {
        let row = ShardRow {
            no_shard_weekdays: vec![Weekday::Mon],
            offset: Span::hours(1),
            interval: Span::hours(6),
            maps: (0..5).map(|i| format!("Map {}", i)).collect(),
            default_reward: None,
        };
        assert!(ShardSchedule::new(vec![row.clone()], HashMap::new()).is_err());
        let err = ShardSchedule::new(vec![row; 5], HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("exactly 2 weekdays"));
    }
}
