//! Civil calendar helpers for the fixed timezone.
//!
//! All day and week boundaries are reckoned on the zone's wall clock, not in
//! UTC. Weeks start on Monday.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// Resolves a wall-clock time in `tz`.
///
/// Ambiguous times (the repeated hour when clocks fall back) resolve to the
/// earlier instant. Times inside a spring-forward gap are pushed forward by
/// an hour, which lands on the first valid wall-clock time after the gap.
pub fn localize(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => match tz.from_local_datetime(&(naive + Duration::hours(1))) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
            LocalResult::None => tz.from_utc_datetime(&naive),
        },
    }
}

/// Midnight of `date` in `tz`.
pub fn midnight(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    localize(tz, date.and_time(NaiveTime::MIN))
}

/// Start of the civil day containing `instant`.
pub fn start_of_day(instant: &DateTime<Tz>) -> DateTime<Tz> {
    midnight(&instant.timezone(), instant.date_naive())
}

/// Start of the civil week (Monday 00:00) containing `instant`.
pub fn start_of_week(instant: &DateTime<Tz>) -> DateTime<Tz> {
    let date = instant.date_naive();
    let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    midnight(&instant.timezone(), monday)
}

/// Moves `instant` by `days` civil days, keeping its wall-clock time.
pub fn add_days(instant: &DateTime<Tz>, days: i64) -> DateTime<Tz> {
    localize(
        &instant.timezone(),
        instant.naive_local() + Duration::days(days),
    )
}

/// Whole civil days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
