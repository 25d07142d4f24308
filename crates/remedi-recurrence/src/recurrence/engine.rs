//! Due-now and range evaluation over a user's schedules.
//!
//! Both operations are pure functions of their inputs. A schedule that fails
//! validation or stops advancing is logged and left out; only an unknown
//! timezone or an inverted range fails the whole call.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::occurrence::Occurrence;
use super::schedule::Schedule;
use super::series::DoseSeries;
use super::timezone::parse_timezone;
use crate::error::{RecurrenceError, RecurrenceResult};

/// Default per-schedule iteration cap for range expansion.
pub const DEFAULT_MAX_STEPS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Extra cursor steps allowed per schedule beyond the number the range
    /// needs; only a cursor that stops advancing exhausts them.
    pub max_steps: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl EngineOptions {
    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

/// Stateless recurrence evaluator; safe to share between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecurrenceEngine {
    options: EngineOptions,
}

impl RecurrenceEngine {
    #[must_use]
    pub const fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub const fn options(&self) -> EngineOptions {
        self.options
    }

    /// ## Summary
    /// Returns the occurrences due at `instant` (minute granularity), one per
    /// matching schedule, sorted and deduplicated.
    ///
    /// ## Errors
    ///
    /// Returns `RecurrenceError::InvalidTimezone` if `timezone` does not resolve.
    #[tracing::instrument(level = "debug", skip(self, schedules), fields(schedules = schedules.len()))]
    pub fn is_due_at(
        &self,
        schedules: &[Schedule],
        timezone: &str,
        instant: DateTime<Utc>,
    ) -> RecurrenceResult<Vec<Occurrence>> {
        let tz = parse_timezone(timezone)?;
        let local_date = instant.with_timezone(&tz).date_naive();

        let due: BTreeSet<Occurrence> = schedules
            .iter()
            .filter(|schedule| schedule.is_active_on(local_date))
            .filter_map(|schedule| bind(schedule, tz))
            .filter_map(|series| {
                series
                    .due_at(instant)
                    .map(|at| Occurrence::new(series.schedule().id, at))
            })
            .collect();

        tracing::debug!(due = due.len(), "Evaluated due reminders");
        Ok(due.into_iter().collect())
    }

    /// ## Summary
    /// Returns every occurrence with an instant in `from..=to`, sorted by
    /// instant and deduplicated.
    ///
    /// ## Errors
    ///
    /// Returns `RecurrenceError::InvalidRange` if `from > to` and
    /// `RecurrenceError::InvalidTimezone` if `timezone` does not resolve.
    #[tracing::instrument(level = "debug", skip(self, schedules), fields(schedules = schedules.len()))]
    pub fn occurrences_in_range(
        &self,
        schedules: &[Schedule],
        timezone: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RecurrenceResult<Vec<Occurrence>> {
        if from > to {
            return Err(RecurrenceError::InvalidRange { from, to });
        }

        let tz = parse_timezone(timezone)?;
        let from_date = from.with_timezone(&tz).date_naive();
        let to_date = to.with_timezone(&tz).date_naive();

        let mut occurrences = BTreeSet::new();
        for series in schedules
            .iter()
            .filter(|schedule| schedule.overlaps(from_date, to_date))
            .filter_map(|schedule| bind(schedule, tz))
        {
            match self.expand(&series, from, to) {
                Ok(found) => occurrences.extend(found),
                Err(err) => {
                    tracing::error!(
                        schedule_id = series.schedule().id,
                        error = %err,
                        "Skipping schedule whose recurrence did not terminate"
                    );
                }
            }
        }

        tracing::debug!(occurrences = occurrences.len(), "Expanded range");
        Ok(occurrences.into_iter().collect())
    }

    /// ## Summary
    /// Walks one series from its first dose, fast-forwarded to `from`, and
    /// collects the occurrences in `from..=to`.
    ///
    /// ## Errors
    ///
    /// Returns `RecurrenceError::ComputationRunaway` if the cursor fails to
    /// move forward, or takes more than `max_steps` steps beyond what the
    /// range needs.
    pub fn expand(
        &self,
        series: &DoseSeries<'_>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RecurrenceResult<Vec<Occurrence>> {
        let schedule_id = series.schedule().id;
        let mut cursor = series.fast_forward(series.first_dose(), from);
        let budget = series
            .steps_until(cursor, to)
            .saturating_add(self.options.max_steps);
        let mut found = Vec::new();
        let mut steps = 0;

        while cursor.instant <= to && !series.past_end(cursor) {
            steps += 1;
            if steps > budget {
                return Err(RecurrenceError::ComputationRunaway {
                    schedule_id,
                    steps: budget,
                });
            }

            if cursor.instant >= from && series.lands_on(cursor) {
                found.push(Occurrence::new(schedule_id, cursor.instant));
            }

            let Some(next) = series.next(cursor) else {
                break;
            };
            if next.instant <= cursor.instant {
                return Err(RecurrenceError::ComputationRunaway { schedule_id, steps });
            }
            cursor = next;
        }

        tracing::trace!(schedule_id, steps, occurrences = found.len(), "Expanded schedule");
        Ok(found)
    }
}

/// Validates a schedule for evaluation, logging and dropping it on failure.
fn bind(schedule: &Schedule, tz: Tz) -> Option<DoseSeries<'_>> {
    match DoseSeries::new(schedule, tz) {
        Ok(series) => Some(series),
        Err(err @ RecurrenceError::UnknownFrequency { .. }) => {
            tracing::warn!(
                schedule_id = schedule.id,
                error = %err,
                "Treating schedule with unrecognized frequency as inactive"
            );
            None
        }
        Err(err) => {
            tracing::warn!(
                schedule_id = schedule.id,
                error = %err,
                "Rejecting invalid schedule"
            );
            None
        }
    }
}

/// ## Summary
/// `RecurrenceEngine::is_due_at` with default options.
///
/// ## Errors
///
/// Returns `RecurrenceError::InvalidTimezone` if `timezone` does not resolve.
pub fn is_due_at(
    schedules: &[Schedule],
    timezone: &str,
    instant: DateTime<Utc>,
) -> RecurrenceResult<Vec<Occurrence>> {
    RecurrenceEngine::default().is_due_at(schedules, timezone, instant)
}

/// ## Summary
/// `RecurrenceEngine::occurrences_in_range` with default options.
///
/// ## Errors
///
/// Returns `RecurrenceError::InvalidRange` if `from > to` and
/// `RecurrenceError::InvalidTimezone` if `timezone` does not resolve.
pub fn occurrences_in_range(
    schedules: &[Schedule],
    timezone: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> RecurrenceResult<Vec<Occurrence>> {
    RecurrenceEngine::default().occurrences_in_range(schedules, timezone, from, to)
}
