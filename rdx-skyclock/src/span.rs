//! A signed span of calendar time with independently tracked units.
//!
//! `Span` mirrors the way event parameters are written down ("2 hours",
//! "1 hour 50 minutes") and keeps each unit separately until it is
//! [`rescaled`](Span::rescale). Period arithmetic goes through the rescaled
//! form.

use crate::civil;
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::Deserialize;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 3_600;
const SECS_PER_DAY: i64 = 86_400;

/// A signed span of days, hours, minutes and seconds.
///
/// Days are calendar days: applying a span to an instant moves the civil
/// date first and then adds the clock part as absolute time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Span {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Span {
    pub const ZERO: Span = Span::new(0, 0, 0, 0);

    pub const fn new(days: i64, hours: i64, minutes: i64, seconds: i64) -> Self {
        Self {
            days,
            hours,
            minutes,
            seconds,
        }
    }

    pub const fn days(days: i64) -> Self {
        Self::new(days, 0, 0, 0)
    }

    pub const fn hours(hours: i64) -> Self {
        Self::new(0, hours, 0, 0)
    }

    pub const fn minutes(minutes: i64) -> Self {
        Self::new(0, 0, minutes, 0)
    }

    pub const fn seconds(seconds: i64) -> Self {
        Self::new(0, 0, 0, seconds)
    }

    pub const fn hm(hours: i64, minutes: i64) -> Self {
        Self::new(0, hours, minutes, 0)
    }

    /// Normalizes the clock part into hours, minutes and seconds, largest
    /// unit first. Every non-zero field ends up with the same sign. Days are
    /// left alone because a civil day is not always 24 hours long.
    pub fn rescale(self) -> Self {
        let clock = self.clock_seconds();
        Self {
            days: self.days,
            hours: clock / SECS_PER_HOUR,
            minutes: (clock % SECS_PER_HOUR) / SECS_PER_MINUTE,
            seconds: clock % SECS_PER_MINUTE,
        }
    }

    /// The span as a whole number of hours, counting a day as 24 hours.
    /// `None` when minutes or seconds would be left over.
    pub fn whole_hours(&self) -> Option<i64> {
        let total = self.total_seconds();
        (total % SECS_PER_HOUR == 0).then_some(total / SECS_PER_HOUR)
    }

    /// The span as a whole number of minutes, counting a day as 24 hours.
    pub fn whole_minutes(&self) -> Option<i64> {
        let total = self.total_seconds();
        (total % SECS_PER_MINUTE == 0).then_some(total / SECS_PER_MINUTE)
    }

    pub fn total_seconds(&self) -> i64 {
        self.days * SECS_PER_DAY + self.clock_seconds()
    }

    pub fn is_negative(&self) -> bool {
        self.total_seconds() < 0
    }

    fn clock_seconds(&self) -> i64 {
        self.hours * SECS_PER_HOUR + self.minutes * SECS_PER_MINUTE + self.seconds
    }

    /// Absolute duration, with a day counted as exactly 24 hours.
    pub fn to_duration(&self) -> Duration {
        Duration::seconds(self.total_seconds())
    }

    /// Moves `instant` forward by this span: civil days first, then the
    /// clock part as elapsed time.
    pub fn add_to(&self, instant: &DateTime<Tz>) -> DateTime<Tz> {
        let shifted = if self.days == 0 {
            *instant
        } else {
            civil::add_days(instant, self.days)
        };
        shifted + Duration::seconds(self.clock_seconds())
    }

    /// Moves `instant` backward by this span.
    pub fn sub_from(&self, instant: &DateTime<Tz>) -> DateTime<Tz> {
        (-*self).add_to(instant)
    }
}

impl Add for Span {
    type Output = Span;

    fn add(self, rhs: Span) -> Span {
        Span::new(
            self.days + rhs.days,
            self.hours + rhs.hours,
            self.minutes + rhs.minutes,
            self.seconds + rhs.seconds,
        )
        .rescale()
    }
}

impl Sub for Span {
    type Output = Span;

    fn sub(self, rhs: Span) -> Span {
        self + (-rhs)
    }
}

impl Neg for Span {
    type Output = Span;

    fn neg(self) -> Span {
        Span::new(-self.days, -self.hours, -self.minutes, -self.seconds)
    }
}

impl Mul<i64> for Span {
    type Output = Span;

    fn mul(self, factor: i64) -> Span {
        Span::new(
            self.days * factor,
            self.hours * factor,
            self.minutes * factor,
            self.seconds * factor,
        )
        .rescale()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = self.rescale();
        let parts: Vec<String> = [
            (span.days, "d"),
            (span.hours, "h"),
            (span.minutes, "m"),
            (span.seconds, "s"),
        ]
        .iter()
        .filter(|(value, _)| *value != 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect();
        if parts.is_empty() {
            write!(f, "0s")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Los_Angeles;

    #[test]
    fn rescale_carries_into_larger_units() {
        let span = Span::new(0, 1, 90, 75).rescale();
        assert_eq!(span, Span::new(0, 2, 31, 15));
    }

    #[test]
    fn rescale_keeps_a_single_sign() {
        let span = Span::new(0, 1, -30, 0).rescale();
        assert_eq!(span, Span::new(0, 0, 30, 0));

        let span = Span::new(0, 0, -1, 30).rescale();
        assert_eq!(span, Span::new(0, 0, 0, -30));
    }

    #[test]
    fn addition_normalizes_mixed_units() {
        let sum = Span::minutes(50) + Span::minutes(20) + Span::seconds(30);
        assert_eq!(sum, Span::new(0, 1, 10, 30));
    }

    #[test]
    fn whole_units_reject_leftovers() {
        assert_eq!(Span::minutes(120).whole_hours(), Some(2));
        assert_eq!(Span::days(1).whole_hours(), Some(24));
        assert_eq!(Span::hm(1, 30).whole_hours(), None);
        assert_eq!(Span::hm(1, 30).whole_minutes(), Some(90));
        assert_eq!(Span::seconds(90).whole_minutes(), None);
    }

    #[test]
    fn multiply_scales_every_unit() {
        assert_eq!(Span::hours(8) * 2, Span::hours(16));
        assert_eq!(Span::hm(1, 45) * 2, Span::hm(3, 30));
    }

    #[test]
    fn add_to_moves_civil_days_across_dst() {
        // 2022-03-13 is the spring-forward day in Los Angeles (23 hours long).
        let before = Los_Angeles.with_ymd_and_hms(2022, 3, 12, 12, 0, 0).unwrap();
        let after = Span::days(1).add_to(&before);
        assert_eq!(after, Los_Angeles.with_ymd_and_hms(2022, 3, 13, 12, 0, 0).unwrap());
        assert_eq!(after - before, Duration::hours(23));
    }

    #[test]
    fn sub_from_is_the_inverse_of_add_to() {
        let instant = Los_Angeles.with_ymd_and_hms(2022, 7, 1, 10, 15, 0).unwrap();
        let span = Span::new(2, 3, 4, 5);
        assert_eq!(span.sub_from(&span.add_to(&instant)), instant);
    }

    #[test]
    fn display_skips_zero_units() {
        assert_eq!(Span::hm(1, 50).to_string(), "1h 50m");
        assert_eq!(Span::ZERO.to_string(), "0s");
        assert_eq!(Span::minutes(-90).to_string(), "-1h -30m");
    }
}
