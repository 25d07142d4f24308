//! The recurrence rule table.
//!
//! One `Rule` variant per frequency kind. Both the single-instant check and
//! the range generator go through `Rule::falls_on` and `Rule::step`, so the
//! two can never disagree about which days carry a dose or how far a cursor
//! moves.

use std::num::NonZeroU32;

use chrono::{Datelike, NaiveDate, Weekday};

/// Set of weekdays, indexed 0 = Sunday .. 6 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// Builds a set from weekday indices, or `None` if any index is outside `0..=6`.
    #[must_use]
    pub fn from_indices(indices: &[i64]) -> Option<Self> {
        indices.iter().try_fold(Self::default(), |set, &index| {
            let bit = u8::try_from(index).ok().filter(|bit| *bit < 7)?;
            Some(Self(set.0 | (1 << bit)))
        })
    }

    #[must_use]
    pub fn contains(self, weekday: Weekday) -> bool {
        self.0 & (1 << weekday.num_days_from_sunday()) != 0
    }

    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// How far one cursor step advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Same wall-clock time, this many calendar days later.
    Days(NonZeroU32),
    /// This many absolute hours later.
    Hours(NonZeroU32),
}

/// A validated recurrence rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Daily,
    SpecificWeekdays(WeekdaySet),
    EveryNDays(NonZeroU32),
    /// A chain of doses every N hours from the first dose on the start date.
    EveryNHours(NonZeroU32),
}

impl Rule {
    /// ## Summary
    /// Day-level validity check: whether a dose belongs on `date` for a
    /// schedule starting on `start`.
    ///
    /// Hourly chains are not day-aligned; they accept every day from `start`
    /// and are matched against the chain itself.
    #[must_use]
    pub fn falls_on(self, start: NaiveDate, date: NaiveDate) -> bool {
        if date < start {
            return false;
        }
        match self {
            Self::Daily | Self::EveryNHours(_) => true,
            Self::SpecificWeekdays(days) => days.contains(date.weekday()),
            Self::EveryNDays(interval) => {
                date.signed_duration_since(start).num_days() % i64::from(interval.get()) == 0
            }
        }
    }

    /// ## Summary
    /// Advance step for the range cursor.
    ///
    /// Weekday schedules step one day at a time and re-check membership.
    #[must_use]
    pub const fn step(self) -> Step {
        match self {
            Self::Daily | Self::SpecificWeekdays(_) => Step::Days(NonZeroU32::MIN),
            Self::EveryNDays(interval) => Step::Days(interval),
            Self::EveryNHours(interval) => Step::Hours(interval),
        }
    }
}
