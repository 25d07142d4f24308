use chrono::TimeDelta;
use chrono_tz::America::Santo_Domingo;
use remedi_test::fixtures::{date, time};
use remedi_test::recurrence::{EngineOptions, Occurrence, RecurrenceEngine, Schedule, is_due_at};

use super::helpers::{local, utc};

const SANTO_DOMINGO: &str = "America/Santo_Domingo";

#[test_log::test]
fn daily_due_only_at_its_minute() {
    let schedules = vec![Schedule::daily(1, time(8, 0), date(2025, 1, 1))];
    let eight = local(Santo_Domingo, 2025, 1, 15, 8, 0);

    let due = is_due_at(&schedules, SANTO_DOMINGO, eight).expect("due");
    assert_eq!(due, vec![Occurrence::new(1, eight)]);

    for off in [-1, 1] {
        let instant = eight + TimeDelta::minutes(off);
        assert!(is_due_at(&schedules, SANTO_DOMINGO, instant).expect("due").is_empty());
    }
}

#[test_log::test]
fn seconds_are_ignored() {
    let schedules = vec![Schedule::daily(1, time(8, 0), date(2025, 1, 1))];
    let eight = local(Santo_Domingo, 2025, 1, 15, 8, 0);

    let due = is_due_at(&schedules, SANTO_DOMINGO, eight + TimeDelta::seconds(59)).expect("due");
    assert_eq!(due, vec![Occurrence::new(1, eight)]);
}

#[test_log::test]
fn weekday_schedule_due_on_listed_days_only() {
    // 2025-01-13 is a Monday
    let schedules = vec![Schedule::specific_weekdays(
        1,
        time(20, 0),
        date(2025, 1, 1),
        &[1, 3, 5],
    )];

    let due_days: Vec<u32> = (13..=19)
        .filter(|day| {
            let at = local(Santo_Domingo, 2025, 1, *day, 20, 0);
            !is_due_at(&schedules, SANTO_DOMINGO, at).expect("due").is_empty()
        })
        .collect();
    assert_eq!(due_days, vec![13, 15, 17]);
}

#[test_log::test]
fn interval_days_due_on_multiples_from_start() {
    let schedules = vec![Schedule::every_n_days(1, time(9, 0), date(2020, 1, 1), 3)];

    // 2025-06-03 is 1980 days after 2020-01-01
    assert!(!is_due_at(&schedules, "UTC", utc(2025, 6, 3, 9, 0)).expect("due").is_empty());
    assert!(is_due_at(&schedules, "UTC", utc(2025, 6, 4, 9, 0)).expect("due").is_empty());
    assert!(is_due_at(&schedules, "UTC", utc(2025, 6, 5, 9, 0)).expect("due").is_empty());
    assert!(!is_due_at(&schedules, "UTC", utc(2025, 6, 6, 9, 0)).expect("due").is_empty());
}

#[test_log::test]
fn hourly_chain_due_from_first_dose() {
    let schedules = vec![Schedule::every_n_hours(1, time(6, 0), date(2025, 1, 1), 8)];

    for hour in [6, 14, 22] {
        let at = local(Santo_Domingo, 2025, 1, 20, hour, 0);
        assert_eq!(
            is_due_at(&schedules, SANTO_DOMINGO, at).expect("due"),
            vec![Occurrence::new(1, at)]
        );
    }
    // Before the first dose on the start date
    let early = local(Santo_Domingo, 2024, 12, 31, 22, 0);
    assert!(is_due_at(&schedules, SANTO_DOMINGO, early).expect("due").is_empty());
}

#[test_log::test]
fn end_date_is_inclusive() {
    let schedules =
        vec![Schedule::daily(1, time(8, 0), date(2025, 1, 1)).with_end_date(date(2025, 1, 10))];

    let last = local(Santo_Domingo, 2025, 1, 10, 8, 0);
    assert_eq!(is_due_at(&schedules, SANTO_DOMINGO, last).expect("due").len(), 1);

    let after = local(Santo_Domingo, 2025, 1, 11, 8, 0);
    assert!(is_due_at(&schedules, SANTO_DOMINGO, after).expect("due").is_empty());
}

#[test_log::test]
fn engine_options_do_not_affect_due_now() {
    let schedules = vec![Schedule::every_n_hours(1, time(0, 0), date(2020, 1, 1), 1)];
    let engine = RecurrenceEngine::new(EngineOptions::default().with_max_steps(1));

    let at = utc(2025, 6, 1, 13, 0);
    assert_eq!(engine.is_due_at(&schedules, "UTC", at).expect("due").len(), 1);
}

#[test_log::test]
fn multiple_schedules_same_minute_sorted_by_id() {
    let schedules = vec![
        Schedule::daily(9, time(8, 0), date(2025, 1, 1)),
        Schedule::every_n_days(4, time(8, 0), date(2025, 1, 1), 2),
        Schedule::daily(2, time(8, 0), date(2025, 1, 1)),
    ];
    let at = local(Santo_Domingo, 2025, 1, 15, 8, 0);

    let ids: Vec<_> = is_due_at(&schedules, SANTO_DOMINGO, at)
        .expect("due")
        .into_iter()
        .map(|occ| occ.schedule_id)
        .collect();
    assert_eq!(ids, vec![2, 4, 9]);
}
