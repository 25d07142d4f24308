//! Domain records shared across crates, without storage dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type MedicationId = i64;
pub type ScheduleId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// IANA zone identifier; `None` falls back to the configured default.
    #[serde(default)]
    pub timezone: Option<String>,
}

impl User {
    /// Returns the user's zone, or `default` when none is set.
    #[must_use]
    pub fn timezone_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.timezone
            .as_deref()
            .filter(|tz| !tz.trim().is_empty())
            .unwrap_or(default)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub id: MedicationId,
    pub user_id: UserId,
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

/// Outcome recorded against a scheduled dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TakeStatus {
    Taken,
    Skipped,
    /// Marked by the system once the dose window passed without action.
    Missed,
}

impl TakeStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Taken => "taken",
            Self::Skipped => "skipped",
            Self::Missed => "missed",
        }
    }
}

impl std::fmt::Display for TakeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeLog {
    pub user_id: UserId,
    pub medication_id: MedicationId,
    pub schedule_id: ScheduleId,
    pub status: TakeStatus,
    /// The occurrence instant this log answers.
    pub scheduled_for: DateTime<Utc>,
    #[serde(default)]
    pub action_taken_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}
