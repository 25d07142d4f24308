//! Delivery seam for due reminders, and lookup of what was delivered.

use std::collections::HashSet;

use tokio::sync::Mutex;

use super::notification::ReminderNotification;
use crate::error::ServiceResult;

/// Result of handing one notification to a dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    /// Already delivered for this schedule and instant.
    Duplicate,
}

/// Persists or delivers reminders.
///
/// The engine gives no delivery-once guarantee; implementations suppress
/// repeats keyed by `ReminderNotification::dedup_key`.
pub trait NotificationDispatcher: Send + Sync {
    /// Delivers one reminder.
    ///
    /// ## Errors
    /// Returns an error if the notification could not be persisted or sent.
    fn dispatch(
        &self,
        notification: ReminderNotification,
    ) -> impl Future<Output = ServiceResult<DispatchOutcome>> + Send;
}

/// Read access to delivered reminders by `ReminderNotification::dedup_key`.
pub trait NotificationLog: Send + Sync {
    /// Finds a delivered reminder.
    ///
    /// ## Errors
    /// Returns an error if the delivery record cannot be read.
    fn find(
        &self,
        dedup_key: &str,
    ) -> impl Future<Output = ServiceResult<Option<ReminderNotification>>> + Send;
}

#[derive(Debug, Default)]
struct Recorded {
    seen: HashSet<String>,
    delivered: Vec<ReminderNotification>,
}

/// In-memory dispatcher that keeps every delivered notification.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    inner: Mutex<Recorded>,
}

impl RecordingDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications delivered so far, in delivery order.
    pub async fn delivered(&self) -> Vec<ReminderNotification> {
        self.inner.lock().await.delivered.clone()
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    async fn dispatch(&self, notification: ReminderNotification) -> ServiceResult<DispatchOutcome> {
        let mut inner = self.inner.lock().await;
        if !inner.seen.insert(notification.dedup_key()) {
            return Ok(DispatchOutcome::Duplicate);
        }
        inner.delivered.push(notification);
        Ok(DispatchOutcome::Delivered)
    }
}

impl NotificationLog for RecordingDispatcher {
    async fn find(&self, dedup_key: &str) -> ServiceResult<Option<ReminderNotification>> {
        Ok(self
            .inner
            .lock()
            .await
            .delivered
            .iter()
            .find(|notification| notification.dedup_key() == dedup_key)
            .cloned())
    }
}
