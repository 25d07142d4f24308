//! Recurrence engine for medication dose schedules.
//!
//! Pure computation: given schedules, a user's timezone and either an
//! instant or an instant range, produces the dose occurrences that are due.

pub mod error;
pub mod recurrence;
