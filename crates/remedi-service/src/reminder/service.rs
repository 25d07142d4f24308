//! The reminder tick: evaluate every user at one minute and forward what is due.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::{StreamExt, stream};
use remedi_core::config::ReminderConfig;
use remedi_core::types::{User, UserId};
use remedi_recurrence::recurrence::{EngineOptions, RecurrenceEngine, truncate_to_minute};
use serde::Serialize;

use super::dispatcher::{DispatchOutcome, NotificationDispatcher};
use super::notification::ReminderNotification;
use super::repository::ScheduleRepository;
use crate::error::{ServiceError, ServiceResult};
use crate::regimen::Regimen;

#[derive(Debug, Clone)]
pub struct ReminderOptions {
    /// Zone used for users without one.
    pub default_timezone: String,
    /// Users evaluated concurrently.
    pub concurrency: usize,
    pub engine: EngineOptions,
}

impl Default for ReminderOptions {
    fn default() -> Self {
        Self {
            default_timezone: "UTC".to_string(),
            concurrency: 8,
            engine: EngineOptions::default(),
        }
    }
}

impl From<&ReminderConfig> for ReminderOptions {
    fn from(config: &ReminderConfig) -> Self {
        Self {
            default_timezone: config.default_timezone.clone(),
            concurrency: config.concurrency,
            engine: EngineOptions::default().with_max_steps(config.max_steps),
        }
    }
}

/// Counters for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    pub users_evaluated: usize,
    pub users_failed: usize,
    pub due: usize,
    pub delivered: usize,
    pub duplicates: usize,
    /// Notifications the dispatcher rejected; the tick moved on to the next one.
    pub failed_dispatches: usize,
}

#[derive(Debug, Default)]
struct UserTick {
    due: usize,
    delivered: usize,
    duplicates: usize,
    failed_dispatches: usize,
}

pub struct ReminderDispatcher<R, D> {
    repository: Arc<R>,
    dispatcher: Arc<D>,
    engine: RecurrenceEngine,
    options: ReminderOptions,
}

impl<R, D> ReminderDispatcher<R, D>
where
    R: ScheduleRepository,
    D: NotificationDispatcher,
{
    #[must_use]
    pub fn new(repository: Arc<R>, dispatcher: Arc<D>, options: ReminderOptions) -> Self {
        Self {
            repository,
            dispatcher,
            engine: RecurrenceEngine::new(options.engine),
            options,
        }
    }

    /// ## Summary
    /// Evaluates every user (or only `only_user`) at `now`, truncated to the
    /// minute, and dispatches one notification per due occurrence.
    ///
    /// A failure while processing one user is logged and counted in
    /// `TickSummary::users_failed`; the remaining users still run. A rejected
    /// notification is counted in `TickSummary::failed_dispatches` and does not
    /// stop the user's other due doses.
    ///
    /// ## Errors
    /// Returns `ServiceError::NotFound` if `only_user` does not exist, or a
    /// storage error if the user list cannot be read.
    #[tracing::instrument(skip(self), fields(now = %now))]
    pub async fn run_tick(
        &self,
        now: DateTime<Utc>,
        only_user: Option<UserId>,
    ) -> ServiceResult<TickSummary> {
        let now = truncate_to_minute(now);

        let users = match only_user {
            Some(user_id) => vec![
                self.repository
                    .user(user_id)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound(format!("user {user_id}")))?,
            ],
            None => self.repository.users().await?,
        };

        let results: Vec<(UserId, ServiceResult<UserTick>)> = stream::iter(users)
            .map(|user| async move { (user.id, self.process_user(&user, now).await) })
            .buffer_unordered(self.options.concurrency.max(1))
            .collect()
            .await;

        let mut summary = TickSummary::default();
        for (user_id, result) in results {
            summary.users_evaluated += 1;
            match result {
                Ok(tick) => {
                    summary.due += tick.due;
                    summary.delivered += tick.delivered;
                    summary.duplicates += tick.duplicates;
                    summary.failed_dispatches += tick.failed_dispatches;
                }
                Err(err) => {
                    summary.users_failed += 1;
                    tracing::error!(user_id, error = %err, "Failed to process reminders for user");
                }
            }
        }

        tracing::info!(
            users = summary.users_evaluated,
            failed = summary.users_failed,
            due = summary.due,
            delivered = summary.delivered,
            duplicates = summary.duplicates,
            failed_dispatches = summary.failed_dispatches,
            "Reminder tick complete"
        );
        Ok(summary)
    }

    async fn process_user(&self, user: &User, now: DateTime<Utc>) -> ServiceResult<UserTick> {
        let user_id = user.id;
        let regimen = Regimen::load(
            self.repository.as_ref(),
            user,
            &self.options.default_timezone,
            now,
            now,
        )
        .await?;

        let due = self
            .engine
            .is_due_at(regimen.schedules(), regimen.timezone(), now)?;
        let mut tick = UserTick {
            due: due.len(),
            ..UserTick::default()
        };

        for occurrence in &due {
            let Some(medication) = regimen.medication_for(occurrence.schedule_id) else {
                tracing::warn!(
                    user_id,
                    schedule_id = occurrence.schedule_id,
                    "Due schedule has no medication for this user"
                );
                continue;
            };

            let notification = ReminderNotification::new(
                user_id,
                medication,
                occurrence,
                regimen.timezone(),
                regimen.tz(),
            );
            match self.dispatcher.dispatch(notification).await {
                Ok(DispatchOutcome::Delivered) => {
                    tracing::debug!(user_id, schedule_id = occurrence.schedule_id, "Reminder sent");
                    tick.delivered += 1;
                }
                Ok(DispatchOutcome::Duplicate) => tick.duplicates += 1,
                Err(err) => {
                    tracing::error!(
                        user_id,
                        schedule_id = occurrence.schedule_id,
                        error = %err,
                        "Failed to dispatch reminder"
                    );
                    tick.failed_dispatches += 1;
                }
            }
        }

        Ok(tick)
    }
}
