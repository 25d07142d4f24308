//! Dashboard summary over the last week and the next day.
//!
//! One range expansion covers everything: six days back from the start of
//! today through the end of tomorrow, in the user's zone.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use remedi_core::types::{MedicationId, ScheduleId, TakeStatus, UserId};
use remedi_recurrence::recurrence::{
    Occurrence, RecurrenceEngine, end_of_day, parse_timezone, start_of_day,
};
use serde::Serialize;

use crate::error::{ServiceError, ServiceResult};
use crate::regimen::Regimen;
use crate::reminder::repository::{ScheduleRepository, TakeLogRepository};

const ADHERENCE_DAYS: u64 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub timezone: String,
    pub next_dose: Option<NextDose>,
    pub active_medications: usize,
    /// Taken doses over scheduled doses for the last seven local days.
    pub adherence_percentage: usize,
    pub reminders_today: Vec<TodayReminder>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextDose {
    pub schedule_id: ScheduleId,
    pub medication_name: String,
    pub instant: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodayReminder {
    pub schedule_id: ScheduleId,
    pub medication_id: MedicationId,
    pub medication_name: String,
    pub dosage: Option<String>,
    pub instant: DateTime<Utc>,
    pub is_past: bool,
    /// Status of the take log recorded for this dose, if any.
    pub status: Option<TakeStatus>,
}

pub struct DashboardService<R> {
    repository: Arc<R>,
    engine: RecurrenceEngine,
    default_timezone: String,
}

fn shift_days(date: NaiveDate, forward: bool, days: u64) -> ServiceResult<NaiveDate> {
    let shifted = if forward {
        date.checked_add_days(Days::new(days))
    } else {
        date.checked_sub_days(Days::new(days))
    };
    shifted.ok_or(ServiceError::InvariantViolation(
        "dashboard window outside the supported date range",
    ))
}

/// Rounded percentage, half away from zero, capped at 100.
fn percentage(part: usize, whole: usize) -> usize {
    if whole == 0 {
        return 100;
    }
    ((part * 100 + whole / 2) / whole).min(100)
}

impl<R> DashboardService<R>
where
    R: ScheduleRepository + TakeLogRepository,
{
    #[must_use]
    pub fn new(repository: Arc<R>, engine: RecurrenceEngine, default_timezone: String) -> Self {
        Self {
            repository,
            engine,
            default_timezone,
        }
    }

    /// ## Summary
    /// Builds the dashboard for `user_id` as seen at `now`.
    ///
    /// ## Errors
    /// Returns `ServiceError::NotFound` for an unknown user, and propagates
    /// invalid timezone and storage errors.
    #[tracing::instrument(skip(self))]
    pub async fn summary(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> ServiceResult<DashboardSummary> {
        let user = self
            .repository
            .user(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {user_id}")))?;
        let tz = parse_timezone(user.timezone_or(&self.default_timezone))?;

        let today = now.with_timezone(&tz).date_naive();
        let week_start = start_of_day(shift_days(today, false, ADHERENCE_DAYS)?, tz);
        let today_start = start_of_day(today, tz);
        let today_end = end_of_day(today, tz);
        let range_end = end_of_day(shift_days(today, true, 1)?, tz);

        let regimen = Regimen::load(
            self.repository.as_ref(),
            &user,
            &self.default_timezone,
            week_start,
            range_end,
        )
        .await?;
        let occurrences = self.engine.occurrences_in_range(
            regimen.schedules(),
            regimen.timezone(),
            week_start,
            range_end,
        )?;

        let next_dose = occurrences
            .iter()
            .find(|occurrence| occurrence.instant > now)
            .and_then(|occurrence| {
                regimen
                    .medication_for(occurrence.schedule_id)
                    .map(|medication| NextDose {
                        schedule_id: occurrence.schedule_id,
                        medication_name: medication.name.clone(),
                        instant: occurrence.instant,
                    })
            });

        let active_medications = self.active_medications(user_id).await?;

        let logs = self
            .repository
            .take_logs(user_id, week_start, today_end)
            .await?;
        let scheduled = occurrences
            .iter()
            .filter(|occurrence| occurrence.instant <= today_end)
            .count();
        let taken = logs
            .iter()
            .filter(|log| log.status == TakeStatus::Taken)
            .count();

        let statuses: HashMap<_, _> = logs
            .iter()
            .filter(|log| log.scheduled_for >= today_start)
            .map(|log| (Occurrence::new(log.schedule_id, log.scheduled_for), log.status))
            .collect();
        let reminders_today = occurrences
            .iter()
            .filter(|occurrence| (today_start..=today_end).contains(&occurrence.instant))
            .filter_map(|occurrence| {
                let medication = regimen.medication_for(occurrence.schedule_id)?;
                Some(TodayReminder {
                    schedule_id: occurrence.schedule_id,
                    medication_id: medication.id,
                    medication_name: medication.name.clone(),
                    dosage: medication.dosage.clone(),
                    instant: occurrence.instant,
                    is_past: occurrence.instant < now,
                    status: statuses.get(occurrence).copied(),
                })
            })
            .collect();

        Ok(DashboardSummary {
            timezone: regimen.timezone().to_string(),
            next_dose,
            active_medications,
            adherence_percentage: percentage(taken, scheduled),
            reminders_today,
        })
    }

    /// Medications with at least one active schedule, regardless of dates.
    async fn active_medications(&self, user_id: UserId) -> ServiceResult<usize> {
        let owned: HashSet<_> = self
            .repository
            .medications(user_id)
            .await?
            .into_iter()
            .map(|medication| medication.id)
            .collect();

        Ok(self
            .repository
            .schedules(user_id)
            .await?
            .iter()
            .filter(|schedule| schedule.is_active && owned.contains(&schedule.medication_id))
            .map(|schedule| schedule.medication_id)
            .collect::<HashSet<_>>()
            .len())
    }
}
