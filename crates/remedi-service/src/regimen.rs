//! A user's schedules and medications, loaded once per evaluation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use remedi_core::types::{Medication, MedicationId, ScheduleId, User};
use remedi_recurrence::recurrence::{Schedule, parse_timezone};

use crate::error::ServiceResult;
use crate::reminder::repository::ScheduleRepository;

#[derive(Debug, Clone)]
pub struct Regimen {
    timezone: String,
    tz: Tz,
    schedules: Vec<Schedule>,
    medications: HashMap<MedicationId, Medication>,
}

impl Regimen {
    /// ## Summary
    /// Resolves the user's timezone and loads the schedules active at some
    /// point in `from..=to`, together with the user's medications.
    ///
    /// ## Errors
    /// Returns `RecurrenceError::InvalidTimezone` (wrapped) if the user's zone
    /// does not resolve, or a storage error from the repository.
    pub async fn load<R: ScheduleRepository>(
        repository: &R,
        user: &User,
        default_timezone: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ServiceResult<Self> {
        let timezone = user.timezone_or(default_timezone).to_string();
        let tz = parse_timezone(&timezone)?;

        let from_date = from.with_timezone(&tz).date_naive();
        let to_date = to.with_timezone(&tz).date_naive();
        let schedules = repository
            .active_schedules(user.id, from_date, to_date)
            .await?;
        let medications = repository
            .medications(user.id)
            .await?
            .into_iter()
            .map(|medication| (medication.id, medication))
            .collect();

        tracing::debug!(
            user_id = user.id,
            timezone = %timezone,
            schedules = schedules.len(),
            "Loaded regimen"
        );

        Ok(Self {
            timezone,
            tz,
            schedules,
            medications,
        })
    }

    /// The zone identifier the engine is called with.
    #[must_use]
    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    #[must_use]
    pub const fn tz(&self) -> Tz {
        self.tz
    }

    #[must_use]
    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    /// Medication a schedule belongs to, if the user owns it.
    #[must_use]
    pub fn medication_for(&self, schedule_id: ScheduleId) -> Option<&Medication> {
        self.schedules
            .iter()
            .find(|schedule| schedule.id == schedule_id)
            .and_then(|schedule| self.medications.get(&schedule.medication_id))
    }
}
