//! Finding the next shard day and the phase within it.

use super::{ShardDay, ShardSchedule, PHASE_LENGTH};
use crate::civil;
use crate::error::{Result, SkyclockError};
use crate::span::Span;
use chrono::DateTime;
use chrono_tz::Tz;
use tracing::debug;

/// Upper bound on how many civil days the next-shard search will inspect.
pub const SEARCH_CAP_DAYS: u32 = 14;

const EARLY_SKY_OFFSET: Span = Span::new(0, 0, -32, -10);
const ERUPTION_OFFSET: Span = Span::minutes(7);
const LAND_OFFSET: Span = Span::new(0, 0, 8, 40);

/// One of the three daily shard phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardPhase {
    /// 0, 1 or 2.
    pub index: u8,
    pub early_sky: DateTime<Tz>,
    pub start: DateTime<Tz>,
    pub eruption: DateTime<Tz>,
    pub land: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl ShardPhase {
    fn ending_at(index: u8, end: DateTime<Tz>) -> Self {
        let start = PHASE_LENGTH.sub_from(&end);
        Self {
            index,
            early_sky: EARLY_SKY_OFFSET.add_to(&start),
            start,
            eruption: ERUPTION_OFFSET.add_to(&start),
            land: LAND_OFFSET.add_to(&start),
            end,
        }
    }
}

impl ShardDay {
    /// The day's three phases, earliest first, built backward from
    /// `last_end` one `interval` at a time.
    pub fn phases(&self) -> [ShardPhase; 3] {
        let third_end = self.last_end;
        let second_end = self.interval.sub_from(&third_end);
        let first_end = self.interval.sub_from(&second_end);
        [
            ShardPhase::ending_at(0, first_end),
            ShardPhase::ending_at(1, second_end),
            ShardPhase::ending_at(2, third_end),
        ]
    }

    /// The earliest phase that has not ended by `from`, or `None` once the
    /// day's last phase is over.
    pub fn upcoming_phase(&self, from: &DateTime<Tz>) -> Option<ShardPhase> {
        self.phases().into_iter().find(|phase| phase.end >= *from)
    }
}

impl ShardSchedule {
    /// Finds the first day, starting with the one containing `from`, that
    /// has shards and whose final phase has not ended by `from`.
    ///
    /// Blacked-out days never come back from this search. Fails with
    /// [`SkyclockError::UnboundedSearch`] if the table never produces such
    /// a day within [`SEARCH_CAP_DAYS`].
    pub fn find_next_shard_day(&self, from: &DateTime<Tz>) -> Result<ShardDay> {
        for offset in 0..SEARCH_CAP_DAYS {
            let candidate = civil::add_days(from, i64::from(offset));
            let day = self.classify_day(&candidate);
            if day.has_shard && day.last_end >= *from {
                return Ok(day);
            }
            debug!(
                date = %day.date,
                has_shard = day.has_shard,
                "skipping shard day"
            );
        }
        Err(SkyclockError::UnboundedSearch {
            from: *from,
            cap: SEARCH_CAP_DAYS,
        })
    }
}
