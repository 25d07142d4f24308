//! JSON-lines notification outbox.
//!
//! Each delivered reminder is appended as one line. Lines already in the
//! file are loaded on open, so a restarted process does not repeat a
//! reminder it already wrote and can still find it by dedup key.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use remedi_service::error::{ServiceError, ServiceResult};
use remedi_service::reminder::{
    DispatchOutcome, NotificationDispatcher, NotificationLog, ReminderNotification,
};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};

#[derive(Debug)]
pub struct OutboxDispatcher {
    path: PathBuf,
    delivered: Mutex<HashMap<String, ReminderNotification>>,
}

impl OutboxDispatcher {
    /// ## Summary
    /// Opens the outbox at `path`, creating parent directories as needed.
    ///
    /// Lines that do not parse as reminders are skipped with a warning.
    ///
    /// ## Errors
    /// Returns `AppError::IoError` if the file or its directory cannot be read or created.
    pub async fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let io_error = |source| AppError::IoError {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }

        let mut delivered = HashMap::new();
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                for (index, line) in contents.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<ReminderNotification>(line) {
                        Ok(notification) => {
                            delivered.insert(notification.dedup_key(), notification);
                        }
                        Err(err) => {
                            tracing::warn!(line = index + 1, error = %err, "Skipping unreadable outbox line");
                        }
                    }
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(io_error(err)),
        }

        tracing::debug!(path = %path.display(), entries = delivered.len(), "Outbox opened");
        Ok(Self {
            path,
            delivered: Mutex::new(delivered),
        })
    }
}

impl NotificationDispatcher for OutboxDispatcher {
    async fn dispatch(&self, notification: ReminderNotification) -> ServiceResult<DispatchOutcome> {
        let key = notification.dedup_key();
        // Held across the write so concurrent users append whole lines.
        let mut delivered = self.delivered.lock().await;
        if delivered.contains_key(&key) {
            tracing::debug!(key = %key, "Reminder already in outbox");
            return Ok(DispatchOutcome::Duplicate);
        }

        let mut line = serde_json::to_string(&notification)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| ServiceError::DispatchError(format!("{}: {e}", self.path.display())))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| ServiceError::DispatchError(format!("{}: {e}", self.path.display())))?;
        file.flush()
            .await
            .map_err(|e| ServiceError::DispatchError(format!("{}: {e}", self.path.display())))?;

        delivered.insert(key, notification);
        Ok(DispatchOutcome::Delivered)
    }
}

impl NotificationLog for OutboxDispatcher {
    async fn find(&self, dedup_key: &str) -> ServiceResult<Option<ReminderNotification>> {
        Ok(self.delivered.lock().await.get(dedup_key).cloned())
    }
}
