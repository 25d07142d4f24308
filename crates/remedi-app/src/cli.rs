use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use remedi_core::types::{TakeStatus, UserId};

use crate::error::{AppError, AppResult};

#[derive(Debug, Parser)]
#[command(name = "remedi", version, about = "Medication reminder scheduler")]
pub struct Cli {
    /// Dataset file, overriding `storage.data_path`
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Outbox file, overriding `storage.outbox_path`
    #[arg(long, global = true)]
    pub outbox: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send due reminders at the start of every minute until interrupted
    Serve,
    /// Send the reminders due now, or at a simulated time
    SendReminders {
        /// Only process this user
        #[arg(long)]
        user: Option<UserId>,
        /// Simulated UTC time, "YYYY-MM-DD HH:MM:SS" or RFC 3339
        #[arg(long)]
        date: Option<String>,
    },
    /// Print calendar events for a range as JSON
    Calendar {
        #[arg(long)]
        user: UserId,
        /// Range start, "YYYY-MM-DD HH:MM:SS" (UTC) or RFC 3339
        #[arg(long)]
        from: String,
        /// Range end, inclusive
        #[arg(long)]
        to: String,
    },
    /// Print the dashboard summary as JSON
    Dashboard {
        #[arg(long)]
        user: UserId,
        /// Simulated UTC time, "YYYY-MM-DD HH:MM:SS" or RFC 3339
        #[arg(long)]
        date: Option<String>,
    },
    /// Record a taken or skipped dose against a delivered reminder
    Log {
        #[arg(long)]
        user: UserId,
        /// Dedup key of the reminder in the outbox, "<schedule>-<unix seconds>"
        #[arg(long)]
        reminder: String,
        #[arg(long, value_enum)]
        status: ActionStatus,
        /// Simulated UTC time of the action, "YYYY-MM-DD HH:MM:SS" or RFC 3339
        #[arg(long)]
        date: Option<String>,
    },
}

/// Answers a user can give to a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionStatus {
    Taken,
    Skipped,
}

impl From<ActionStatus> for TakeStatus {
    fn from(status: ActionStatus) -> Self {
        match status {
            ActionStatus::Taken => Self::Taken,
            ActionStatus::Skipped => Self::Skipped,
        }
    }
}

/// ## Summary
/// Parses a command-line instant. Naive values are taken as UTC.
///
/// ## Errors
/// Returns `AppError::InvalidArgument` if the value matches no accepted format.
pub fn parse_instant(value: &str) -> AppResult<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::InvalidArgument(format!("unrecognized date/time: {value}")))
}

/// Parses `value` if given, otherwise returns the current time.
///
/// ## Errors
/// Returns `AppError::InvalidArgument` for an unparseable value.
pub fn instant_or_now(value: Option<&str>) -> AppResult<DateTime<Utc>> {
    value.map_or_else(|| Ok(Utc::now()), parse_instant)
}
