//! In-memory repositories over a serde dataset.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use remedi_core::types::{Medication, TakeLog, User, UserId};
use remedi_recurrence::recurrence::Schedule;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::repository::{ScheduleRepository, TakeLogRepository};
use crate::error::ServiceResult;

/// Everything the reminder services read, in its persisted shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    #[serde(default)]
    pub take_logs: Vec<TakeLog>,
}

impl Dataset {
    /// ## Errors
    /// Returns `ServiceError::JsonError` if `json` is not a valid dataset.
    pub fn from_json(json: &str) -> ServiceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    dataset: RwLock<Dataset>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset: RwLock::new(dataset),
        }
    }

    /// Copy of the current dataset, for writing back to its file.
    pub async fn snapshot(&self) -> Dataset {
        self.dataset.read().await.clone()
    }
}

impl ScheduleRepository for InMemoryStore {
    async fn users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.dataset.read().await.users.clone())
    }

    async fn user(&self, user_id: UserId) -> ServiceResult<Option<User>> {
        Ok(self
            .dataset
            .read()
            .await
            .users
            .iter()
            .find(|user| user.id == user_id)
            .cloned())
    }

    async fn medications(&self, user_id: UserId) -> ServiceResult<Vec<Medication>> {
        Ok(self
            .dataset
            .read()
            .await
            .medications
            .iter()
            .filter(|medication| medication.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn schedules(&self, user_id: UserId) -> ServiceResult<Vec<Schedule>> {
        let dataset = self.dataset.read().await;
        let owned: HashSet<_> = dataset
            .medications
            .iter()
            .filter(|medication| medication.user_id == user_id)
            .map(|medication| medication.id)
            .collect();

        Ok(dataset
            .schedules
            .iter()
            .filter(|schedule| owned.contains(&schedule.medication_id))
            .cloned()
            .collect())
    }
}

impl TakeLogRepository for InMemoryStore {
    async fn take_logs(
        &self,
        user_id: UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ServiceResult<Vec<TakeLog>> {
        Ok(self
            .dataset
            .read()
            .await
            .take_logs
            .iter()
            .filter(|log| log.user_id == user_id && (from..=to).contains(&log.scheduled_for))
            .cloned()
            .collect())
    }

    async fn record_take_log(&self, log: TakeLog) -> ServiceResult<bool> {
        let mut dataset = self.dataset.write().await;
        let existing = dataset.take_logs.iter_mut().find(|existing| {
            existing.user_id == log.user_id
                && existing.schedule_id == log.schedule_id
                && existing.scheduled_for == log.scheduled_for
        });

        if let Some(existing) = existing {
            *existing = log;
            return Ok(true);
        }
        dataset.take_logs.push(log);
        Ok(false)
    }
}
