use chrono::{DateTime, Utc};
use remedi_core::types::ScheduleId;
use serde::{Deserialize, Serialize};

/// One concrete dose-due event.
///
/// Ordering is by instant, then schedule id, which is the order results are
/// returned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Occurrence {
    pub instant: DateTime<Utc>,
    pub schedule_id: ScheduleId,
}

impl Occurrence {
    #[must_use]
    pub const fn new(schedule_id: ScheduleId, instant: DateTime<Utc>) -> Self {
        Self {
            instant,
            schedule_id,
        }
    }

    /// Stable identity of the occurrence: `"<schedule id>-<unix seconds>"`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}-{}", self.schedule_id, self.instant.timestamp())
    }
}
