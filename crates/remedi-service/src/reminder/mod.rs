//! Due-reminder dispatch.
//!
//! ## Module Organization
//!
//! - `repository`: storage seams for users, medications, schedules and take logs
//! - `notification`: the reminder payload
//! - `dispatcher`: delivery and lookup seams, and an in-memory recording dispatcher
//! - `memory`: in-memory repositories over a JSON dataset
//! - `service`: the per-minute tick over every user

pub mod dispatcher;
pub mod memory;
pub mod notification;
pub mod repository;
pub mod service;

pub use dispatcher::{
    DispatchOutcome, NotificationDispatcher, NotificationLog, RecordingDispatcher,
};
pub use memory::{Dataset, InMemoryStore};
pub use notification::{REMINDER_MESSAGE_KEY, ReminderNotification};
pub use repository::{ScheduleRepository, TakeLogRepository};
pub use service::{ReminderDispatcher, ReminderOptions, TickSummary};
