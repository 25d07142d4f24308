use chrono::{TimeDelta, Timelike};
use chrono_tz::America::New_York;
use chrono_tz::Europe::London;
use remedi_test::fixtures::{date, time};
use remedi_test::recurrence::{Occurrence, Schedule, is_due_at, occurrences_in_range};

use super::helpers::utc;

const NEW_YORK: &str = "America/New_York";

#[test_log::test]
fn daily_keeps_wall_clock_across_spring_forward() {
    let schedules = vec![Schedule::daily(1, time(8, 0), date(2025, 3, 1))];

    // EST on the 8th, EDT from the 9th
    let before = utc(2025, 3, 8, 13, 0);
    let after = utc(2025, 3, 9, 12, 0);

    assert_eq!(is_due_at(&schedules, NEW_YORK, before).expect("due"), vec![Occurrence::new(1, before)]);
    assert_eq!(is_due_at(&schedules, NEW_YORK, after).expect("due"), vec![Occurrence::new(1, after)]);
    // The fixed-offset guess is an hour late
    assert!(is_due_at(&schedules, NEW_YORK, utc(2025, 3, 9, 13, 0)).expect("due").is_empty());

    let occurrences =
        occurrences_in_range(&schedules, NEW_YORK, before, after).expect("range");
    assert_eq!(occurrences.len(), 2);
    assert_eq!(occurrences[1].instant - occurrences[0].instant, TimeDelta::hours(23));
}

#[test_log::test]
fn daily_keeps_wall_clock_across_fall_back() {
    let schedules = vec![Schedule::daily(1, time(8, 0), date(2025, 10, 1))];

    let occurrences = occurrences_in_range(
        &schedules,
        NEW_YORK,
        utc(2025, 11, 1, 0, 0),
        utc(2025, 11, 3, 23, 0),
    )
    .expect("range");

    let instants: Vec<_> = occurrences.iter().map(|occ| occ.instant).collect();
    assert_eq!(
        instants,
        vec![utc(2025, 11, 1, 12, 0), utc(2025, 11, 2, 13, 0), utc(2025, 11, 3, 13, 0)]
    );
    assert_eq!(instants[1] - instants[0], TimeDelta::hours(25));
}

#[test_log::test]
fn dose_in_gap_moves_forward() {
    // 02:30 does not exist on 2025-03-09 in New York
    let schedules = vec![Schedule::daily(1, time(2, 30), date(2025, 3, 1))];

    let occurrences = occurrences_in_range(
        &schedules,
        NEW_YORK,
        utc(2025, 3, 8, 0, 0),
        utc(2025, 3, 10, 23, 0),
    )
    .expect("range");

    let local: Vec<_> = occurrences
        .iter()
        .map(|occ| {
            let at = occ.instant.with_timezone(&New_York);
            (at.hour(), at.minute())
        })
        .collect();
    assert_eq!(local, vec![(2, 30), (3, 30), (2, 30)]);

    // The shifted dose is due at its resolved instant
    let shifted = occurrences[1].instant;
    assert_eq!(shifted, utc(2025, 3, 9, 7, 30));
    assert_eq!(is_due_at(&schedules, NEW_YORK, shifted).expect("due").len(), 1);
}

#[test_log::test]
fn dose_in_fold_fires_once_at_earliest() {
    // 01:30 happens twice on 2025-11-02 in New York
    let schedules = vec![Schedule::daily(1, time(1, 30), date(2025, 10, 1))];
    let first = utc(2025, 11, 2, 5, 30);
    let second = utc(2025, 11, 2, 6, 30);

    assert_eq!(is_due_at(&schedules, NEW_YORK, first).expect("due").len(), 1);
    assert!(is_due_at(&schedules, NEW_YORK, second).expect("due").is_empty());

    let occurrences = occurrences_in_range(&schedules, NEW_YORK, first, second).expect("range");
    assert_eq!(occurrences, vec![Occurrence::new(1, first)]);
}

#[test_log::test]
fn hourly_chain_keeps_absolute_spacing() {
    // 8-hour chain from 2025-03-29 00:00 London, across the 30 March change
    let schedules = vec![Schedule::every_n_hours(1, time(0, 0), date(2025, 3, 29), 8)];

    let occurrences = occurrences_in_range(
        &schedules,
        "Europe/London",
        utc(2025, 3, 29, 0, 0),
        utc(2025, 3, 31, 0, 0),
    )
    .expect("range");

    assert!(
        occurrences
            .windows(2)
            .all(|pair| pair[1].instant - pair[0].instant == TimeDelta::hours(8))
    );
    let hours: Vec<_> = occurrences
        .iter()
        .map(|occ| occ.instant.with_timezone(&London).hour())
        .collect();
    // Local hours shift by one once BST starts at 01:00 UTC on the 30th
    assert_eq!(hours, vec![0, 8, 16, 0, 9, 17, 1]);
}
