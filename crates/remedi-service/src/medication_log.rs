//! Turning a delivered reminder into a take log.
//!
//! The reminder carries the dose it was sent for, so the log records
//! `scheduled_for` as the reminder's instant and `action_taken_at` as the
//! moment the user answered.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use remedi_core::error::CoreError;
use remedi_core::types::{TakeLog, TakeStatus, UserId};

use crate::error::{ServiceError, ServiceResult};
use crate::reminder::dispatcher::NotificationLog;
use crate::reminder::notification::ReminderNotification;
use crate::reminder::repository::{ScheduleRepository, TakeLogRepository};

pub struct MedicationLogService<R, N> {
    repository: Arc<R>,
    notifications: Arc<N>,
}

impl<R, N> MedicationLogService<R, N>
where
    R: ScheduleRepository + TakeLogRepository,
    N: NotificationLog,
{
    #[must_use]
    pub const fn new(repository: Arc<R>, notifications: Arc<N>) -> Self {
        Self {
            repository,
            notifications,
        }
    }

    /// ## Summary
    /// Records the user's answer to the reminder identified by `dedup_key`.
    ///
    /// A second answer for the same dose replaces the first.
    ///
    /// ## Errors
    /// Returns `ServiceError::NotFound` if no reminder with that key was
    /// delivered to `user_id`, and `CoreError::ValidationError` (wrapped) if
    /// `status` is not a user action or the reminder no longer matches one of
    /// the user's schedules.
    #[tracing::instrument(skip(self))]
    pub async fn record_action(
        &self,
        user_id: UserId,
        dedup_key: &str,
        status: TakeStatus,
        now: DateTime<Utc>,
    ) -> ServiceResult<TakeLog> {
        if status == TakeStatus::Missed {
            return Err(CoreError::ValidationError(
                "missed is recorded by the system, not by a user action".to_string(),
            )
            .into());
        }

        let notification = self
            .notifications
            .find(dedup_key)
            .await?
            .filter(|notification| notification.user_id == user_id)
            .ok_or_else(|| ServiceError::NotFound(format!("reminder {dedup_key}")))?;
        self.check_schedule(&notification).await?;

        let log = TakeLog {
            user_id,
            medication_id: notification.medication_id,
            schedule_id: notification.schedule_id,
            status,
            scheduled_for: notification.reminder_time,
            action_taken_at: Some(now),
            notes: None,
        };
        let replaced = self.repository.record_take_log(log.clone()).await?;

        tracing::info!(
            user_id,
            schedule_id = log.schedule_id,
            scheduled_for = %log.scheduled_for,
            replaced,
            "Recorded medication action"
        );
        Ok(log)
    }

    async fn check_schedule(&self, notification: &ReminderNotification) -> ServiceResult<()> {
        let schedules = self.repository.schedules(notification.user_id).await?;
        let matches = schedules.iter().any(|schedule| {
            schedule.id == notification.schedule_id
                && schedule.medication_id == notification.medication_id
        });

        if matches {
            Ok(())
        } else {
            Err(CoreError::ValidationError(format!(
                "reminder {} refers to schedule {} which is not on medication {}",
                notification.dedup_key(),
                notification.schedule_id,
                notification.medication_id
            ))
            .into())
        }
    }
}
