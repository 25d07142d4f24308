//! Reminder payload handed to the notification collaborator.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use remedi_core::types::{Medication, MedicationId, ScheduleId, UserId};
use remedi_recurrence::recurrence::Occurrence;
use serde::{Deserialize, Serialize};

/// Translation key clients render the reminder text from.
pub const REMINDER_MESSAGE_KEY: &str = "Take your medication reminder";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderNotification {
    pub user_id: UserId,
    pub medication_id: MedicationId,
    pub medication_name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    pub schedule_id: ScheduleId,
    /// The occurrence instant.
    pub reminder_time: DateTime<Utc>,
    /// Local `HH:MM` in the user's zone.
    pub time_to_take: String,
    pub timezone: String,
    pub message_key: String,
}

impl ReminderNotification {
    #[must_use]
    pub fn new(
        user_id: UserId,
        medication: &Medication,
        occurrence: &Occurrence,
        timezone: &str,
        tz: Tz,
    ) -> Self {
        Self {
            user_id,
            medication_id: medication.id,
            medication_name: medication.name.clone(),
            dosage: medication.dosage.clone(),
            instructions: medication.instructions.clone(),
            schedule_id: occurrence.schedule_id,
            reminder_time: occurrence.instant,
            time_to_take: occurrence
                .instant
                .with_timezone(&tz)
                .format("%H:%M")
                .to_string(),
            timezone: timezone.to_string(),
            message_key: REMINDER_MESSAGE_KEY.to_string(),
        }
    }

    /// Identity used to suppress repeated delivery of the same dose.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        format!("{}-{}", self.schedule_id, self.reminder_time.timestamp())
    }
}
