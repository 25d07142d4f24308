//! Property tests: the fast-forwarded range walk against naive enumeration,
//! and agreement between the range and due-now evaluators.

use chrono::{DateTime, Days, TimeDelta, Utc};
use chrono_tz::Tz;
use proptest::prelude::*;
use remedi_test::fixtures::{date, time};
use remedi_test::recurrence::{Schedule, is_due_at, occurrences_in_range};

use super::helpers::brute_force;

fn zone() -> impl Strategy<Value = Tz> {
    prop_oneof![
        Just(Tz::UTC),
        Just(Tz::America__New_York),
        Just(Tz::America__Santo_Domingo),
        Just(Tz::Europe__London),
        Just(Tz::Australia__Sydney),
    ]
}

fn schedule(id: i64) -> impl Strategy<Value = Schedule> {
    let dose_time = (0u32..24, prop_oneof![Just(0u32), Just(15), Just(30), Just(45)])
        .prop_map(|(hour, minute)| time(hour, minute));
    let start = (0u64..2000).prop_map(|offset| date(2020, 1, 1) + Days::new(offset));
    let end = proptest::option::of(0u64..400);
    let weekdays = proptest::sample::subsequence(vec![0i64, 1, 2, 3, 4, 5, 6], 1..=7);

    (0u8..4, dose_time, start, end, weekdays, 1i64..15, 1i64..49).prop_map(
        move |(kind, dose_time, start, end, weekdays, days, hours)| {
            let schedule = match kind {
                0 => Schedule::daily(id, dose_time, start),
                1 => Schedule::specific_weekdays(id, dose_time, start, &weekdays),
                2 => Schedule::every_n_days(id, dose_time, start, days),
                _ => Schedule::every_n_hours(id, dose_time, start, hours),
            };
            match end {
                Some(length) => schedule.with_end_date(start + Days::new(length)),
                None => schedule,
            }
        },
    )
}

/// A window of up to three weeks somewhere between 2020 and 2026.
fn window() -> impl Strategy<Value = (DateTime<Utc>, DateTime<Utc>)> {
    (0i64..2400 * 24, 0i64..21 * 24).prop_map(|(offset, length)| {
        let from = date(2020, 1, 1).and_time(time(0, 0)).and_utc() + TimeDelta::hours(offset);
        (from, from + TimeDelta::hours(length))
    })
}

proptest! {
    /// Fast-forwarding never changes which doses a range contains.
    #[test]
    fn range_matches_naive_enumeration(
        schedule in schedule(1),
        tz in zone(),
        (from, to) in window(),
    ) {
        let found: Vec<_> = occurrences_in_range(std::slice::from_ref(&schedule), tz.name(), from, to)
            .map_err(|e| TestCaseError::fail(e.to_string()))?
            .into_iter()
            .map(|occ| occ.instant)
            .collect();

        prop_assert_eq!(found, brute_force(&schedule, tz, from, to));
    }

    /// Every dose in a range is also reported as due at its instant.
    #[test]
    fn range_occurrences_are_due(
        schedule in schedule(1),
        tz in zone(),
        (from, to) in window(),
    ) {
        let schedules = [schedule];
        let occurrences = occurrences_in_range(&schedules, tz.name(), from, to)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        for occurrence in occurrences {
            let due = is_due_at(&schedules, tz.name(), occurrence.instant)
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(due, vec![occurrence]);
        }
    }

    /// Results across schedules are sorted and free of duplicates.
    #[test]
    fn merged_results_sorted_and_unique(
        first in schedule(1),
        second in schedule(2),
        tz in zone(),
        (from, to) in window(),
    ) {
        let schedules = [first.clone(), second, first];
        let occurrences = occurrences_in_range(&schedules, tz.name(), from, to)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert!(occurrences.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
