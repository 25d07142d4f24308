//! Per-schedule dose series: a validated schedule bound to a timezone.
//!
//! A `Cursor` walks the series. Day-based rules keep the intended local date
//! in the cursor and re-resolve the dose time through the zone on every step;
//! hourly chains advance in absolute time from the first dose.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use chrono_tz::Tz;

use super::rule::{Rule, Step};
use super::schedule::Schedule;
use super::timezone::{localize, truncate_to_minute};
use crate::error::RecurrenceResult;

/// Position of the range cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Intended wall-clock date and time in the user's zone.
    pub local: NaiveDateTime,
    /// The resolved dose instant.
    pub instant: DateTime<Utc>,
}

/// A schedule's recurrence evaluated in one timezone.
#[derive(Debug, Clone, Copy)]
pub struct DoseSeries<'a> {
    schedule: &'a Schedule,
    rule: Rule,
    tz: Tz,
    dose_time: NaiveTime,
}

impl<'a> DoseSeries<'a> {
    /// ## Summary
    /// Validates `schedule` and binds it to `tz`.
    ///
    /// ## Errors
    ///
    /// Returns the validation error from `Schedule::rule`.
    pub fn new(schedule: &'a Schedule, tz: Tz) -> RecurrenceResult<Self> {
        Ok(Self {
            schedule,
            rule: schedule.rule()?,
            tz,
            dose_time: schedule.dose_time(),
        })
    }

    #[must_use]
    pub const fn schedule(&self) -> &'a Schedule {
        self.schedule
    }

    #[must_use]
    pub const fn rule(&self) -> Rule {
        self.rule
    }

    fn at_date(&self, date: NaiveDate) -> Cursor {
        Cursor {
            local: date.and_time(self.dose_time),
            instant: localize(date, self.dose_time, self.tz).with_timezone(&Utc),
        }
    }

    fn at_instant(&self, instant: DateTime<Utc>) -> Cursor {
        Cursor {
            local: instant.with_timezone(&self.tz).naive_local(),
            instant,
        }
    }

    /// The first dose: `start_date` at `time_of_day` in the user's zone.
    #[must_use]
    pub fn first_dose(&self) -> Cursor {
        self.at_date(self.schedule.start_date)
    }

    /// ## Summary
    /// Advances the cursor by one rule step.
    ///
    /// Returns `None` only when the calendar overflows.
    #[must_use]
    pub fn next(&self, cursor: Cursor) -> Option<Cursor> {
        match self.rule.step() {
            Step::Days(days) => cursor
                .local
                .date()
                .checked_add_days(Days::new(u64::from(days.get())))
                .map(|date| self.at_date(date)),
            Step::Hours(hours) => cursor
                .instant
                .checked_add_signed(TimeDelta::hours(i64::from(hours.get())))
                .map(|instant| self.at_instant(instant)),
        }
    }

    /// ## Summary
    /// Jumps the cursor forward over every whole interval that ends before
    /// `from`, in constant time.
    ///
    /// The returned cursor is never after the first occurrence at or after
    /// `from`, so stepping from it yields the same occurrences as stepping
    /// from the first dose.
    #[must_use]
    pub fn fast_forward(&self, cursor: Cursor, from: DateTime<Utc>) -> Cursor {
        if cursor.instant >= from {
            return cursor;
        }

        let from_date = from.with_timezone(&self.tz).date_naive();
        let cursor_date = cursor.local.date();

        match self.rule {
            Rule::Daily | Rule::SpecificWeekdays(_) => {
                if from_date > cursor_date {
                    self.at_date(from_date)
                } else {
                    cursor
                }
            }
            Rule::EveryNDays(interval) => {
                let interval = i64::from(interval.get());
                let gap = from_date.signed_duration_since(cursor_date).num_days();
                u64::try_from(gap / interval * interval)
                    .ok()
                    .filter(|days| *days > 0)
                    .and_then(|days| cursor_date.checked_add_days(Days::new(days)))
                    .map_or(cursor, |date| self.at_date(date))
            }
            Rule::EveryNHours(interval) => {
                let period = i64::from(interval.get()) * 3600;
                let elapsed = from.signed_duration_since(cursor.instant).num_seconds();
                cursor
                    .instant
                    .checked_add_signed(TimeDelta::seconds(elapsed / period * period))
                    .map_or(cursor, |instant| self.at_instant(instant))
            }
        }
    }

    /// ## Summary
    /// Closed-form count of the steps a well-formed walk takes from `cursor`
    /// through `to`, including the position at `cursor` itself.
    #[must_use]
    pub fn steps_until(&self, cursor: Cursor, to: DateTime<Utc>) -> usize {
        let (span, unit) = match self.rule.step() {
            Step::Days(days) => (
                to.with_timezone(&self.tz)
                    .date_naive()
                    .signed_duration_since(cursor.local.date())
                    .num_days(),
                i64::from(days.get()),
            ),
            Step::Hours(hours) => (
                to.signed_duration_since(cursor.instant).num_hours(),
                i64::from(hours.get()),
            ),
        };
        usize::try_from(span.max(0) / unit)
            .unwrap_or(usize::MAX)
            .saturating_add(1)
    }

    /// Kind-specific validity check for a cursor position.
    #[must_use]
    pub fn lands_on(&self, cursor: Cursor) -> bool {
        self.rule
            .falls_on(self.schedule.start_date, cursor.local.date())
    }

    /// Whether the cursor has moved beyond the end of `end_date`.
    #[must_use]
    pub fn past_end(&self, cursor: Cursor) -> bool {
        self.schedule
            .end_date
            .is_some_and(|end| cursor.local.date() > end)
    }

    /// ## Summary
    /// Single-instant check: returns the occurrence instant if a dose is due
    /// at `instant`, compared at minute granularity.
    #[must_use]
    pub fn due_at(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let truncated = truncate_to_minute(instant);
        let local_date = truncated.with_timezone(&self.tz).date_naive();

        if !self.schedule.is_active_on(local_date)
            || !self.rule.falls_on(self.schedule.start_date, local_date)
        {
            return None;
        }

        match self.rule.step() {
            Step::Days(_) => {
                let expected = self.at_date(local_date).instant;
                (expected == truncated).then_some(expected)
            }
            Step::Hours(hours) => {
                let first = self.first_dose().instant;
                if truncated < first {
                    return None;
                }
                let elapsed = truncated.signed_duration_since(first).num_minutes();
                (elapsed % (i64::from(hours.get()) * 60) == 0).then_some(truncated)
            }
        }
    }
}
