//! Traveling Spirit visits: a numbered event every other week.
//!
//! Visits end on a week boundary (Monday 00:00) and start `span_days`
//! earlier. Parity is anchored at a known historical visit whose end date
//! and number are configured as the pivot.

use crate::civil;
use crate::error::{Result, SkyclockError};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Weekday};
use chrono_tz::Tz;
use serde::Deserialize;

const CYCLE_DAYS: i64 = 14;

fn default_pivot_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, 10).unwrap_or(NaiveDate::MIN)
}

fn default_pivot_index() -> i64 {
    52
}

fn default_span_days() -> i64 {
    4
}

/// Anchor and length of the biweekly visit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BiweeklyParams {
    /// The Monday on which the pivot visit ends.
    #[serde(default = "default_pivot_date")]
    pub pivot_date: NaiveDate,
    /// The number of the visit ending on `pivot_date`.
    #[serde(default = "default_pivot_index")]
    pub pivot_index: i64,
    /// How many days each visit lasts.
    #[serde(default = "default_span_days")]
    pub span_days: i64,
}

impl Default for BiweeklyParams {
    fn default() -> Self {
        Self {
            pivot_date: default_pivot_date(),
            pivot_index: default_pivot_index(),
            span_days: default_span_days(),
        }
    }
}

/// The next visit (possibly in progress) and the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiweeklyOccurrence {
    pub next_start: DateTime<Tz>,
    pub next_end: DateTime<Tz>,
    pub next_index: i64,
    pub prev_start: DateTime<Tz>,
    pub prev_end: DateTime<Tz>,
    pub prev_index: i64,
}

impl BiweeklyParams {
    pub fn validate(&self) -> Result<()> {
        if self.pivot_date.weekday() != Weekday::Mon {
            return Err(SkyclockError::config(format!(
                "traveling spirit pivot {} is a {:?}, visits end on a Monday",
                self.pivot_date,
                self.pivot_date.weekday()
            )));
        }
        if !(1..CYCLE_DAYS).contains(&self.span_days) {
            return Err(SkyclockError::config(format!(
                "traveling spirit visits must last 1 to {} days, got {}",
                CYCLE_DAYS - 1,
                self.span_days
            )));
        }
        Ok(())
    }

    /// Resolves the visit that ends at the first matching week boundary
    /// after `now`.
    pub fn resolve(&self, now: &DateTime<Tz>) -> BiweeklyOccurrence {
        let tz = now.timezone();
        let mut end_date = civil::start_of_week(now).date_naive() + Duration::weeks(1);
        let weeks_from_pivot = civil::days_between(self.pivot_date, end_date) / 7;
        if weeks_from_pivot.rem_euclid(2) == 1 {
            end_date += Duration::weeks(1);
        }

        // Equivalent to ceil(weeks(next_start - pivot) / 2): the start sits
        // less than a cycle before an end that is a whole number of cycles
        // from the pivot.
        let next_index =
            self.pivot_index + civil::days_between(self.pivot_date, end_date) / CYCLE_DAYS;

        let start_date = end_date - Duration::days(self.span_days);
        let prev_end_date = end_date - Duration::days(CYCLE_DAYS);
        let prev_start_date = start_date - Duration::days(CYCLE_DAYS);

        BiweeklyOccurrence {
            next_start: civil::midnight(&tz, start_date),
            next_end: civil::midnight(&tz, end_date),
            next_index,
            prev_start: civil::midnight(&tz, prev_start_date),
            prev_end: civil::midnight(&tz, prev_end_date),
            prev_index: next_index - 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Los_Angeles;

    fn at(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Tz> {
        Los_Angeles.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn pivot_visit_keeps_its_number() {
        let params = BiweeklyParams::default();
        let visit = params.resolve(&at(2022, 1, 6, 0));
        assert_eq!(visit.next_start, at(2022, 1, 6, 0));
        assert_eq!(visit.next_end, at(2022, 1, 10, 0));
        assert_eq!(visit.next_index, 52);
        assert_eq!(visit.prev_index, 51);
        assert_eq!(visit.prev_start, at(2021, 12, 23, 0));
    }

    #[test]
    fn in_progress_visit_is_reported_as_next() {
        let params = BiweeklyParams::default();
        let visit = params.resolve(&at(2022, 1, 8, 15));
        assert_eq!(visit.next_index, 52);
        assert!(visit.next_start < at(2022, 1, 8, 15));
    }

    #[test]
    fn off_week_points_at_the_following_visit() {
        let params = BiweeklyParams::default();
        let visit = params.resolve(&at(2022, 1, 12, 9));
        assert_eq!(visit.next_start, at(2022, 1, 20, 0));
        assert_eq!(visit.next_end, at(2022, 1, 24, 0));
        assert_eq!(visit.next_index, 53);
        assert_eq!(visit.prev_end, at(2022, 1, 10, 0));
        assert_eq!(visit.prev_index, 52);
    }

    #[test]
    fn visits_before_the_pivot_count_down() {
        let params = BiweeklyParams::default();
        let visit = params.resolve(&at(2021, 12, 24, 12));
        assert_eq!(visit.next_end, at(2021, 12, 27, 0));
        assert_eq!(visit.next_index, 51);
    }

    #[test]
    fn visits_start_on_thursday() {
        let params = BiweeklyParams::default();
        for day in 0..28 {
            let now = at(2022, 2, 1, 12) + Duration::days(day);
            let visit = params.resolve(&now);
            assert_eq!(visit.next_start.weekday(), Weekday::Thu);
            assert_eq!(visit.next_end.weekday(), Weekday::Mon);
            assert!(visit.next_end > now);
        }
    }

    #[test]
    fn rejects_pivot_that_is_not_a_monday() {
        let params = BiweeklyParams {
            pivot_date: NaiveDate::from_ymd_opt(2022, 1, 6).unwrap(),
            ..BiweeklyParams::default()
        };
        assert!(params.validate().is_err());
        assert!(BiweeklyParams::default().validate().is_ok());
    }
}
