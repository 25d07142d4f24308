//! Medication schedule definitions as supplied by the schedule store.
//!
//! A `Schedule` keeps the persisted row shape: the frequency kind plus the
//! optional per-kind fields. `Schedule::rule` validates that shape into a
//! `Rule`, which is what the evaluators work with.

use std::num::NonZeroU32;

use chrono::{NaiveDate, NaiveTime, Timelike};
use remedi_core::types::{MedicationId, ScheduleId};
use serde::{Deserialize, Serialize};

use super::rule::{Rule, WeekdaySet};
use crate::error::{RecurrenceError, RecurrenceResult};

/// Recurrence kind of a schedule, stored as its persisted string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FrequencyKind {
    Daily,
    SpecificWeekdays,
    EveryNDays,
    EveryNHours,
    /// A value this build does not know; such schedules never fire.
    Unrecognized(String),
}

impl FrequencyKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Daily => "daily",
            Self::SpecificWeekdays => "specific_days",
            Self::EveryNDays => "interval_in_days",
            Self::EveryNHours => "hourly_interval",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for FrequencyKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "daily" => Self::Daily,
            "specific_days" => Self::SpecificWeekdays,
            "interval_in_days" => Self::EveryNDays,
            "hourly_interval" => Self::EveryNHours,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<FrequencyKind> for String {
    fn from(kind: FrequencyKind) -> Self {
        match kind {
            FrequencyKind::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for FrequencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dose schedule for one medication.
///
/// `time_of_day` is a wall-clock time in the owning user's timezone; for
/// hourly schedules it is the time of the first dose on `start_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    #[serde(default)]
    pub medication_id: MedicationId,
    #[serde(with = "time_of_day")]
    pub time_of_day: NaiveTime,
    pub frequency: FrequencyKind,
    /// Weekday indices, 0 = Sunday .. 6 = Saturday.
    #[serde(default)]
    pub weekdays: Option<Vec<i64>>,
    #[serde(default)]
    pub interval_days: Option<i64>,
    #[serde(default)]
    pub interval_hours: Option<i64>,
    pub start_date: NaiveDate,
    /// Inclusive; the schedule runs through the end of this day.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl Schedule {
    fn base(id: ScheduleId, time_of_day: NaiveTime, start_date: NaiveDate) -> Self {
        Self {
            id,
            medication_id: 0,
            time_of_day,
            frequency: FrequencyKind::Daily,
            weekdays: None,
            interval_days: None,
            interval_hours: None,
            start_date,
            end_date: None,
            is_active: true,
        }
    }

    #[must_use]
    pub fn daily(id: ScheduleId, time_of_day: NaiveTime, start_date: NaiveDate) -> Self {
        Self::base(id, time_of_day, start_date)
    }

    #[must_use]
    pub fn specific_weekdays(
        id: ScheduleId,
        time_of_day: NaiveTime,
        start_date: NaiveDate,
        weekdays: &[i64],
    ) -> Self {
        Self {
            frequency: FrequencyKind::SpecificWeekdays,
            weekdays: Some(weekdays.to_vec()),
            ..Self::base(id, time_of_day, start_date)
        }
    }

    #[must_use]
    pub fn every_n_days(
        id: ScheduleId,
        time_of_day: NaiveTime,
        start_date: NaiveDate,
        interval_days: i64,
    ) -> Self {
        Self {
            frequency: FrequencyKind::EveryNDays,
            interval_days: Some(interval_days),
            ..Self::base(id, time_of_day, start_date)
        }
    }

    #[must_use]
    pub fn every_n_hours(
        id: ScheduleId,
        time_of_day: NaiveTime,
        start_date: NaiveDate,
        interval_hours: i64,
    ) -> Self {
        Self {
            frequency: FrequencyKind::EveryNHours,
            interval_hours: Some(interval_hours),
            ..Self::base(id, time_of_day, start_date)
        }
    }

    #[must_use]
    pub fn for_medication(mut self, medication_id: MedicationId) -> Self {
        self.medication_id = medication_id;
        self
    }

    #[must_use]
    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    #[must_use]
    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Dose time at minute granularity.
    #[must_use]
    pub fn dose_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.time_of_day.hour(), self.time_of_day.minute(), 0)
            .unwrap_or(self.time_of_day)
    }

    /// ## Summary
    /// Activity rule: the schedule is enabled and `date` lies within
    /// `start_date..=end_date`.
    #[must_use]
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.is_active
            && self.start_date <= date
            && self.end_date.is_none_or(|end| end >= date)
    }

    /// ## Summary
    /// Returns `true` if the schedule is active on any day of `from..=to`.
    #[must_use]
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.is_active
            && self.start_date <= to
            && self.end_date.is_none_or(|end| end >= from)
    }

    /// ## Summary
    /// Validates the kind-specific fields and builds the matching `Rule`.
    ///
    /// ## Errors
    ///
    /// Returns `RecurrenceError::UnknownFrequency` for unrecognized kinds and
    /// `RecurrenceError::InvalidScheduleData` when the fields required by the
    /// kind are missing or out of range, or when `end_date` precedes
    /// `start_date`.
    pub fn rule(&self) -> RecurrenceResult<Rule> {
        if let Some(end) = self.end_date.filter(|end| *end < self.start_date) {
            return Err(self.invalid(format!(
                "end date {end} precedes start date {}",
                self.start_date
            )));
        }

        match &self.frequency {
            FrequencyKind::Daily => Ok(Rule::Daily),
            FrequencyKind::SpecificWeekdays => {
                let indices = self
                    .weekdays
                    .as_deref()
                    .ok_or_else(|| self.invalid("weekdays missing".to_string()))?;
                if indices.is_empty() {
                    return Err(self.invalid("weekday set is empty".to_string()));
                }
                let days = WeekdaySet::from_indices(indices).ok_or_else(|| {
                    self.invalid(format!("weekday indices out of range: {indices:?}"))
                })?;
                Ok(Rule::SpecificWeekdays(days))
            }
            FrequencyKind::EveryNDays => self
                .positive_interval(self.interval_days, "interval_days")
                .map(Rule::EveryNDays),
            FrequencyKind::EveryNHours => self
                .positive_interval(self.interval_hours, "interval_hours")
                .map(Rule::EveryNHours),
            FrequencyKind::Unrecognized(kind) => Err(RecurrenceError::UnknownFrequency {
                schedule_id: self.id,
                kind: kind.clone(),
            }),
        }
    }

    fn positive_interval(&self, value: Option<i64>, field: &str) -> RecurrenceResult<NonZeroU32> {
        let raw = value.ok_or_else(|| self.invalid(format!("{field} missing")))?;
        u32::try_from(raw)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or_else(|| self.invalid(format!("{field} must be a positive integer, got {raw}")))
    }

    fn invalid(&self, reason: String) -> RecurrenceError {
        RecurrenceError::InvalidScheduleData {
            schedule_id: self.id,
            reason,
        }
    }
}

/// Serde adapter for `HH:MM` (or `HH:MM:SS`) times of day.
pub mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    /// ## Errors
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    /// ## Errors
    /// Fails if the value is not `HH:MM` or `HH:MM:SS`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M:%S")
            .or_else(|_e| NaiveTime::parse_from_str(&raw, "%H:%M"))
            .map_err(|e| serde::de::Error::custom(format!("invalid time of day {raw:?}: {e}")))
    }
}
