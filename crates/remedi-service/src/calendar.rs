//! Calendar view: range occurrences as display-ready events.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use remedi_core::types::{MedicationId, ScheduleId, UserId};
use remedi_recurrence::recurrence::RecurrenceEngine;
use serde::Serialize;

use crate::error::{ServiceError, ServiceResult};
use crate::regimen::Regimen;
use crate::reminder::repository::ScheduleRepository;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// `<scheduleId>-<unixSeconds>`
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub all_day: bool,
    pub extended_props: EventProps,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventProps {
    pub dosage: Option<String>,
    pub schedule_id: ScheduleId,
    pub medication_id: MedicationId,
}

pub struct CalendarService<R> {
    repository: Arc<R>,
    engine: RecurrenceEngine,
    default_timezone: String,
}

impl<R: ScheduleRepository> CalendarService<R> {
    #[must_use]
    pub fn new(repository: Arc<R>, engine: RecurrenceEngine, default_timezone: String) -> Self {
        Self {
            repository,
            engine,
            default_timezone,
        }
    }

    /// ## Summary
    /// Returns one event per occurrence in `from..=to`, in instant order.
    ///
    /// ## Errors
    /// Returns `ServiceError::NotFound` for an unknown user, and propagates
    /// invalid range, invalid timezone and storage errors.
    #[tracing::instrument(skip(self))]
    pub async fn events_for_range(
        &self,
        user_id: UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ServiceResult<Vec<CalendarEvent>> {
        let user = self
            .repository
            .user(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {user_id}")))?;
        let regimen = Regimen::load(
            self.repository.as_ref(),
            &user,
            &self.default_timezone,
            from,
            to,
        )
        .await?;

        let occurrences =
            self.engine
                .occurrences_in_range(regimen.schedules(), regimen.timezone(), from, to)?;

        let events: Vec<_> = occurrences
            .iter()
            .filter_map(|occurrence| {
                let medication = regimen.medication_for(occurrence.schedule_id)?;
                Some(CalendarEvent {
                    id: occurrence.key(),
                    title: medication.name.clone(),
                    start: occurrence.instant,
                    all_day: false,
                    extended_props: EventProps {
                        dosage: medication.dosage.clone(),
                        schedule_id: occurrence.schedule_id,
                        medication_id: medication.id,
                    },
                })
            })
            .collect();

        tracing::debug!(events = events.len(), "Built calendar events");
        Ok(events)
    }
}
