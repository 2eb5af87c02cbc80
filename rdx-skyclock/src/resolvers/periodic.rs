//! Intra-day windows that repeat every few hours (geysers, dinners, concerts).

use crate::error::{Result, SkyclockError};
use crate::span::Span;
use chrono::{DateTime, SubsecRound, Timelike};
use chrono_tz::Tz;
use serde::Deserialize;

/// Recurrence parameters for a periodic window, as written in config.
///
/// A window opens every `period` at `offset` past the aligned hour, lasts
/// `full_duration`, and may have a pre-active warm-up and a post-active
/// wind-down inside it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PeriodicWindowParams {
    pub period: Span,
    pub offset: Option<Span>,
    pub full_duration: Span,
    pub pre_active_duration: Option<Span>,
    pub post_active_duration: Option<Span>,
    pub started_description: Option<String>,
    pub active_description: Option<String>,
}

/// A validated periodic schedule. Period and offset are stored rescaled to
/// the units the resolver works in.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicSchedule {
    params: PeriodicWindowParams,
    period_hours: i64,
    offset_minutes: i64,
}

/// The next window at or after "now" and the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicWindow {
    pub next_start: DateTime<Tz>,
    pub next_end: DateTime<Tz>,
    pub next_active_start: Option<DateTime<Tz>>,
    pub next_active_end: Option<DateTime<Tz>>,
    pub prev_start: DateTime<Tz>,
    pub prev_end: DateTime<Tz>,
}

impl PeriodicSchedule {
    /// Validates `params`. `name` is only used in error messages.
    pub fn new(name: &str, params: PeriodicWindowParams) -> Result<Self> {
        let period_hours = params
            .period
            .whole_hours()
            .filter(|hours| *hours > 0)
            .ok_or_else(|| {
                SkyclockError::config(format!(
                    "'{}': period {} is not a positive whole number of hours",
                    name, params.period
                ))
            })?;

        let offset = params.offset.unwrap_or(Span::ZERO);
        let offset_minutes = offset
            .whole_minutes()
            .filter(|minutes| (0..60).contains(minutes) && *minutes < period_hours * 60)
            .ok_or_else(|| {
                SkyclockError::config(format!(
                    "'{}': offset {} must be whole minutes within the first hour of the period",
                    name, offset
                ))
            })?;

        if params.full_duration.total_seconds() <= 0 {
            return Err(SkyclockError::config(format!(
                "'{}': full duration must be positive",
                name
            )));
        }

        let pre = params.pre_active_duration.unwrap_or(Span::ZERO);
        let post = params.post_active_duration.unwrap_or(Span::ZERO);
        if pre.is_negative() || post.is_negative() {
            return Err(SkyclockError::config(format!(
                "'{}': active phase durations cannot be negative",
                name
            )));
        }
        if (pre + post).total_seconds() > params.full_duration.total_seconds() {
            return Err(SkyclockError::config(format!(
                "'{}': pre-active {} plus post-active {} exceeds full duration {}",
                name, pre, post, params.full_duration
            )));
        }

        Ok(Self {
            params,
            period_hours,
            offset_minutes,
        })
    }

    pub fn params(&self) -> &PeriodicWindowParams {
        &self.params
    }

    /// Resolves the next window starting at or after `now`.
    ///
    /// The start is reached by rounding up to the next whole minute, moving
    /// to the offset minute, and then jumping whole hours to the next
    /// period-aligned hour. When `now` already sits in an aligned hour at or
    /// before the offset minute, no hours are added: the window in that hour
    /// is the next one.
    pub fn resolve(&self, now: &DateTime<Tz>) -> PeriodicWindow {
        let now = now.trunc_subsecs(0);
        let seconds_to_next_minute = (60 - i64::from(now.second())) % 60;
        let minute_delta = self.offset_minutes
            - i64::from(now.minute())
            - i64::from(seconds_to_next_minute > 0);
        let hour_offset = i64::from(now.hour()) % self.period_hours;
        let hours = if hour_offset == 0 && minute_delta >= 0 {
            0
        } else {
            self.period_hours - hour_offset
        };

        let step = Span::new(0, hours, minute_delta, seconds_to_next_minute).rescale();
        let next_start = now + step.to_duration();
        let next_end = next_start + self.params.full_duration.to_duration();
        let period = self.params.period.to_duration();

        PeriodicWindow {
            next_start,
            next_end,
            next_active_start: self
                .params
                .pre_active_duration
                .map(|pre| next_start + pre.to_duration()),
            next_active_end: self
                .params
                .post_active_duration
                .map(|post| next_end - post.to_duration()),
            prev_start: next_start - period,
            prev_end: next_end - period,
        }
    }
}

/// Sanctuary Geyser: every two hours on the hour.
pub fn sanctuary_geyser() -> PeriodicWindowParams {
    PeriodicWindowParams {
        period: Span::hours(2),
        offset: Some(Span::minutes(0)),
        full_duration: Span::minutes(15),
        pre_active_duration: Some(Span::minutes(5)),
        post_active_duration: None,
        started_description: Some("Geyser is about to erupt".to_string()),
        active_description: Some("Geyser is erupting".to_string()),
    }
}

/// Forest Grandma Dinner: every two hours at half past.
pub fn forest_grandma_dinner() -> PeriodicWindowParams {
    PeriodicWindowParams {
        period: Span::hours(2),
        offset: Some(Span::minutes(30)),
        full_duration: Span::minutes(15),
        pre_active_duration: Some(Span::minutes(5)),
        post_active_duration: None,
        started_description: Some("Grandma is cooking".to_string()),
        active_description: Some("Food is ready".to_string()),
    }
}

pub fn sanctuary_turtle() -> PeriodicWindowParams {
    PeriodicWindowParams {
        period: Span::hours(2),
        offset: Some(Span::minutes(50)),
        full_duration: Span::minutes(10),
        pre_active_duration: None,
        post_active_duration: None,
        started_description: Some("Turtle is about to come out".to_string()),
        active_description: Some("Turtle is out! Help to burn the dark plants".to_string()),
    }
}

pub fn aurora_concert() -> PeriodicWindowParams {
    PeriodicWindowParams {
        period: Span::hours(4),
        offset: None,
        full_duration: Span::minutes(60),
        pre_active_duration: Some(Span::minutes(10)),
        post_active_duration: None,
        started_description: Some("Concert is about to start! Grab a seat!".to_string()),
        active_description: Some("Concert is in progress! Enjoy!".to_string()),
    }
}

/// The hourly events the game has run unchanged for years.
pub fn builtin_events() -> Vec<(&'static str, PeriodicWindowParams)> {
    vec![
        ("Sanctuary Geyser", sanctuary_geyser()),
        ("Forest Grandma Dinner", forest_grandma_dinner()),
        ("Sanctuary Turtle", sanctuary_turtle()),
        ("Aurora Concert", aurora_concert()),
    ]
}
