use chrono::{DateTime, Utc};
use remedi_core::types::ScheduleId;
use thiserror::Error;

/// Recurrence evaluation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("Invalid schedule data for schedule {schedule_id}: {reason}")]
    InvalidScheduleData {
        schedule_id: ScheduleId,
        reason: String,
    },

    #[error("Unrecognized frequency kind for schedule {schedule_id}: {kind}")]
    UnknownFrequency {
        schedule_id: ScheduleId,
        kind: String,
    },

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    #[error("Schedule {schedule_id} stopped advancing after {steps} steps")]
    ComputationRunaway {
        schedule_id: ScheduleId,
        steps: usize,
    },

    #[error("Invalid range: {from} is after {to}")]
    InvalidRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

impl RecurrenceError {
    /// ## Summary
    /// Returns `true` for errors confined to a single schedule.
    ///
    /// Batch operations skip such schedules instead of failing the call.
    #[must_use]
    pub const fn is_schedule_local(&self) -> bool {
        matches!(
            self,
            Self::InvalidScheduleData { .. }
                | Self::UnknownFrequency { .. }
                | Self::ComputationRunaway { .. }
        )
    }
}

pub type RecurrenceResult<T> = std::result::Result<T, RecurrenceError>;
