//! Timezone resolution and wall-clock to UTC conversion for dose times.
//!
//! All day arithmetic is done on local calendar dates and re-resolved through
//! the zone, so "next day at 08:00" stays 08:00 across DST transitions.

use chrono::{
    DateTime, DurationRound, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta,
    TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::{RecurrenceError, RecurrenceResult};

const LAST_SECOND: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 59) {
    Some(time) => time,
    None => NaiveTime::MIN,
};

/// ## Summary
/// Resolves an IANA timezone identifier to a `chrono_tz::Tz`.
///
/// ## Errors
///
/// Returns `RecurrenceError::InvalidTimezone` if the identifier cannot be resolved.
pub fn parse_timezone(tzid: &str) -> RecurrenceResult<Tz> {
    let normalized = normalize_tzid(tzid);

    normalized.parse::<Tz>().map_err(|_e| {
        tracing::warn!(tzid = %tzid, "Unrecognized timezone identifier");
        RecurrenceError::InvalidTimezone(tzid.to_string())
    })
}

/// Strips vendor prefixes some calendar clients put in front of IANA names.
fn normalize_tzid(tzid: &str) -> &str {
    let trimmed = tzid.trim();
    trimmed
        .strip_prefix("/mozilla.org/")
        .or_else(|| trimmed.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(trimmed)
}

/// ## Summary
/// Resolves a local wall-clock date and time in `tz` to an absolute instant.
///
/// Ambiguous times (DST fold) resolve to the earliest instant. Non-existent
/// times (DST gap) are interpreted with the offset in force before the
/// transition, which moves them forward by the length of the gap: 02:30 on a
/// spring-forward night becomes 03:30.
#[must_use]
pub fn localize(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Tz> {
    let local = NaiveDateTime::new(date, time);

    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _latest) => earliest,
        LocalResult::None => {
            let day_before = local - TimeDelta::days(1);
            let offset = tz.offset_from_utc_datetime(&day_before).fix();
            let utc = local - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
            tracing::trace!(
                local = %local,
                tz = %tz,
                "Wall-clock time falls in a DST gap, shifting forward"
            );
            tz.from_utc_datetime(&utc)
        }
    }
}

/// Returns the first instant of `date` in `tz`.
#[must_use]
pub fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    localize(date, NaiveTime::MIN, tz).with_timezone(&Utc)
}

/// Returns the last whole second of `date` in `tz`.
#[must_use]
pub fn end_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    match date.succ_opt() {
        Some(next) => start_of_day(next, tz) - TimeDelta::seconds(1),
        None => localize(date, LAST_SECOND, tz).with_timezone(&Utc),
    }
}

/// Drops seconds and sub-seconds from an instant.
#[must_use]
pub fn truncate_to_minute(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .duration_trunc(TimeDelta::minutes(1))
        .unwrap_or(instant)
}
