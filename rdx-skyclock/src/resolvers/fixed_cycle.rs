//! Daily and weekly resets.

use crate::civil;
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::Deserialize;

/// The length of a fixed reset cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cycle {
    Day,
    Week,
}

impl Cycle {
    fn days(self) -> i64 {
        match self {
            Cycle::Day => 1,
            Cycle::Week => 7,
        }
    }

    /// Start of the cycle containing `now`.
    pub fn start(self, now: &DateTime<Tz>) -> DateTime<Tz> {
        match self {
            Cycle::Day => civil::start_of_day(now),
            Cycle::Week => civil::start_of_week(now),
        }
    }
}

/// The reset that opened the current cycle and the one that closes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleBounds {
    pub previous: DateTime<Tz>,
    pub next: DateTime<Tz>,
}

/// Resolves the reset boundaries around `now`.
///
/// `next` is the end of the current cycle plus one second, so it is never
/// equal to `previous` and always strictly after `now`.
pub fn resolve(now: &DateTime<Tz>, cycle: Cycle) -> CycleBounds {
    let previous = cycle.start(now);
    let end = civil::add_days(&previous, cycle.days());
    CycleBounds {
        previous,
        next: end + Duration::seconds(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday, Datelike};
    use chrono_tz::America::Los_Angeles;

    #[test]
    fn daily_reset_brackets_now() {
        let now = Los_Angeles.with_ymd_and_hms(2022, 7, 14, 15, 30, 0).unwrap();
        let bounds = resolve(&now, Cycle::Day);
        assert_eq!(bounds.previous, Los_Angeles.with_ymd_and_hms(2022, 7, 14, 0, 0, 0).unwrap());
        assert_eq!(bounds.next, Los_Angeles.with_ymd_and_hms(2022, 7, 15, 0, 0, 1).unwrap());
        assert_eq!(bounds.next - bounds.previous, Duration::days(1) + Duration::seconds(1));
    }

    #[test]
    fn weekly_reset_starts_monday() {
        let now = Los_Angeles.with_ymd_and_hms(2022, 7, 17, 23, 0, 0).unwrap();
        let bounds = resolve(&now, Cycle::Week);
        assert_eq!(bounds.previous.weekday(), Weekday::Mon);
        assert_eq!(bounds.previous, Los_Angeles.with_ymd_and_hms(2022, 7, 11, 0, 0, 0).unwrap());
        assert_eq!(bounds.next - bounds.previous, Duration::weeks(1) + Duration::seconds(1));
    }

    #[test]
    fn next_follows_now_at_midnight() {
        let midnight = Los_Angeles.with_ymd_and_hms(2022, 7, 14, 0, 0, 0).unwrap();
        let bounds = resolve(&midnight, Cycle::Day);
        assert_eq!(bounds.previous, midnight);
        assert!(bounds.next > midnight);
    }

    #[test]
    fn short_dst_day_keeps_civil_length() {
        let now = Los_Angeles.with_ymd_and_hms(2022, 3, 13, 12, 0, 0).unwrap();
        let bounds = resolve(&now, Cycle::Day);
        assert_eq!(bounds.next - bounds.previous, Duration::hours(23) + Duration::seconds(1));
    }
}
