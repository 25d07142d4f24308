//! Storage seams for the reminder subsystem.
//!
//! Implementations own persistence; the services go through these traits
//! for every read and write and never cache across calls.

use chrono::{DateTime, NaiveDate, Utc};
use remedi_core::types::{Medication, TakeLog, User, UserId};
use remedi_recurrence::recurrence::Schedule;

use crate::error::ServiceResult;

/// Read access to users, their medications and dose schedules.
pub trait ScheduleRepository: Send + Sync {
    /// Lists every user that may receive reminders.
    ///
    /// ## Errors
    /// Returns an error if the store cannot be read.
    fn users(&self) -> impl Future<Output = ServiceResult<Vec<User>>> + Send;

    /// Looks up a single user.
    ///
    /// ## Errors
    /// Returns an error if the store cannot be read.
    fn user(&self, user_id: UserId) -> impl Future<Output = ServiceResult<Option<User>>> + Send;

    /// Lists the medications owned by a user.
    ///
    /// ## Errors
    /// Returns an error if the store cannot be read.
    fn medications(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = ServiceResult<Vec<Medication>>> + Send;

    /// Lists every schedule attached to the user's medications, active or not.
    ///
    /// ## Errors
    /// Returns an error if the store cannot be read.
    fn schedules(&self, user_id: UserId)
    -> impl Future<Output = ServiceResult<Vec<Schedule>>> + Send;

    /// ## Summary
    /// Lists the user's active schedules whose date span overlaps
    /// `from..=to` (local dates).
    ///
    /// Stores with a query language should override this with a filtered query.
    ///
    /// ## Errors
    /// Returns an error if the store cannot be read.
    fn active_schedules(
        &self,
        user_id: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = ServiceResult<Vec<Schedule>>> + Send {
        async move {
            let schedules = self.schedules(user_id).await?;
            Ok(schedules
                .into_iter()
                .filter(|schedule| schedule.overlaps(from, to))
                .collect())
        }
    }
}

/// Access to recorded dose outcomes.
pub trait TakeLogRepository: Send + Sync {
    /// Lists the user's take logs with `scheduled_for` in `from..=to`.
    ///
    /// ## Errors
    /// Returns an error if the store cannot be read.
    fn take_logs(
        &self,
        user_id: UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = ServiceResult<Vec<TakeLog>>> + Send;

    /// ## Summary
    /// Stores `log`, replacing any log the user already has for the same
    /// schedule and `scheduled_for`.
    ///
    /// Returns `true` when an existing log was replaced.
    ///
    /// ## Errors
    /// Returns an error if the store cannot be written.
    fn record_take_log(&self, log: TakeLog) -> impl Future<Output = ServiceResult<bool>> + Send;
}
