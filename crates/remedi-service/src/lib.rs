//! Collaborators around the recurrence engine.
//!
//! ## Module Organization
//!
//! - `reminder`: repository and dispatcher seams, the per-minute reminder tick
//! - `calendar`: range occurrences mapped to display-ready events
//! - `dashboard`: next dose, adherence and today's reminders
//! - `medication_log`: a user's taken or skipped answer to a delivered reminder
//! - `regimen`: a user's schedules and medications loaded for one evaluation

pub mod calendar;
pub mod dashboard;
pub mod error;
pub mod medication_log;
pub mod regimen;
pub mod reminder;
