use std::sync::Arc;

use chrono_tz::America::Santo_Domingo;
use remedi_test::app::store::load_store;
use remedi_test::model::types::{TakeLog, TakeStatus};
use remedi_test::recurrence::RecurrenceEngine;
use remedi_test::service::calendar::CalendarService;
use remedi_test::service::dashboard::DashboardService;
use remedi_test::service::error::ServiceError;
use remedi_test::service::medication_log::MedicationLogService;
use remedi_test::service::reminder::{
    InMemoryStore, RecordingDispatcher, ReminderDispatcher, ReminderOptions, TakeLogRepository,
};

use super::helpers::local;

const DATASET: &str = r#"{
    "users": [{"id": 1, "name": "Ana", "timezone": "America/Santo_Domingo"}],
    "medications": [
        {"id": 10, "user_id": 1, "name": "Metformin", "dosage": "500 mg"},
        {"id": 11, "user_id": 1, "name": "Lisinopril", "dosage": "10 mg"},
        {"id": 12, "user_id": 1, "name": "Old prescription"}
    ],
    "schedules": [
        {"id": 100, "medication_id": 10, "time_of_day": "08:00:00", "frequency": "daily", "start_date": "2025-01-01"},
        {"id": 101, "medication_id": 11, "time_of_day": "20:00", "frequency": "specific_days", "weekdays": [1, 3, 5], "start_date": "2025-01-01"},
        {"id": 102, "medication_id": 12, "time_of_day": "09:00", "frequency": "daily", "start_date": "2024-01-01", "end_date": "2024-06-30", "is_active": false},
        {"id": 103, "medication_id": 10, "time_of_day": "10:00", "frequency": "every_full_moon", "start_date": "2025-01-01"}
    ]
}"#;

async fn store() -> Arc<InMemoryStore> {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("remedi.json");
    tokio::fs::write(&path, DATASET).await.expect("write dataset");
    Arc::new(load_store(&path).await.expect("load dataset"))
}

#[test_log::test(tokio::test)]
async fn calendar_week_view() {
    let service = CalendarService::new(store().await, RecurrenceEngine::default(), "UTC".to_string());
    // Monday 2025-01-13 through Sunday 2025-01-19, local
    let from = local(Santo_Domingo, 2025, 1, 13, 0, 0);
    let to = local(Santo_Domingo, 2025, 1, 19, 23, 59);

    let events = service.events_for_range(1, from, to).await.expect("events");

    assert_eq!(events.len(), 10);
    assert_eq!(events.iter().filter(|e| e.title == "Metformin").count(), 7);
    assert_eq!(events.iter().filter(|e| e.title == "Lisinopril").count(), 3);
    assert!(events.windows(2).all(|pair| pair[0].start <= pair[1].start));

    let json = serde_json::to_value(&events[0]).expect("json");
    assert_eq!(json["title"], "Metformin");
    assert_eq!(json["allDay"], false);
    assert_eq!(json["extendedProps"]["dosage"], "500 mg");
}

#[test_log::test(tokio::test)]
async fn calendar_unknown_user() {
    let service = CalendarService::new(store().await, RecurrenceEngine::default(), "UTC".to_string());
    let at = local(Santo_Domingo, 2025, 1, 13, 0, 0);

    let err = service.events_for_range(9, at, at).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test_log::test(tokio::test)]
async fn dashboard_reflects_take_logs() {
    let store = store().await;
    // Wednesday 2025-01-15, 12:00 local
    let now = local(Santo_Domingo, 2025, 1, 15, 12, 0);
    let morning = local(Santo_Domingo, 2025, 1, 15, 8, 0);
    let evening = local(Santo_Domingo, 2025, 1, 15, 20, 0);

    for (day, status) in [(13, TakeStatus::Taken), (14, TakeStatus::Taken), (15, TakeStatus::Taken)] {
        store
            .record_take_log(TakeLog {
                user_id: 1,
                medication_id: 10,
                schedule_id: 100,
                status,
                scheduled_for: local(Santo_Domingo, 2025, 1, day, 8, 0),
                action_taken_at: None,
                notes: None,
            })
            .await
            .expect("record take log");
    }
    store
        .record_take_log(TakeLog {
            user_id: 1,
            medication_id: 11,
            schedule_id: 101,
            status: TakeStatus::Missed,
            scheduled_for: local(Santo_Domingo, 2025, 1, 13, 20, 0),
            action_taken_at: None,
            notes: Some("Forgot".to_string()),
        })
        .await
        .expect("record take log");

    let service = DashboardService::new(store, RecurrenceEngine::default(), "UTC".to_string());
    let summary = service.summary(1, now).await.expect("summary");

    assert_eq!(summary.timezone, "America/Santo_Domingo");
    assert_eq!(summary.active_medications, 2);

    let next = summary.next_dose.expect("next dose");
    assert_eq!(next.medication_name, "Lisinopril");
    assert_eq!(next.instant, evening);

    // Jan 9..15: 7 daily doses, Lisinopril on Fri 10, Mon 13 and Wed 15
    assert_eq!(summary.adherence_percentage, 30);

    assert_eq!(summary.reminders_today.len(), 2);
    assert_eq!(summary.reminders_today[0].instant, morning);
    assert!(summary.reminders_today[0].is_past);
    assert_eq!(summary.reminders_today[0].status, Some(TakeStatus::Taken));
    assert_eq!(summary.reminders_today[1].instant, evening);
    assert!(!summary.reminders_today[1].is_past);
    assert_eq!(summary.reminders_today[1].status, None);
}

#[test_log::test(tokio::test)]
async fn recorded_action_updates_dashboard() {
    let store = store().await;
    let recorder = Arc::new(RecordingDispatcher::new());
    let morning = local(Santo_Domingo, 2025, 1, 15, 8, 0);
    let now = local(Santo_Domingo, 2025, 1, 15, 12, 0);

    let reminders = ReminderDispatcher::new(
        Arc::clone(&store),
        Arc::clone(&recorder),
        ReminderOptions::default(),
    );
    let tick = reminders.run_tick(morning, Some(1)).await.expect("tick");
    assert_eq!(tick.delivered, 1);
    let key = recorder.delivered().await[0].dedup_key();

    let dashboard = DashboardService::new(
        Arc::clone(&store),
        RecurrenceEngine::default(),
        "UTC".to_string(),
    );
    let before = dashboard.summary(1, now).await.expect("summary");
    assert_eq!(before.reminders_today[0].status, None);
    assert_eq!(before.adherence_percentage, 0);

    let log_service = MedicationLogService::new(Arc::clone(&store), recorder);
    let log = log_service
        .record_action(1, &key, TakeStatus::Taken, now)
        .await
        .expect("record action");
    assert_eq!(log.scheduled_for, morning);
    assert_eq!(log.action_taken_at, Some(now));

    let after = dashboard.summary(1, now).await.expect("summary");
    assert_eq!(after.reminders_today[0].instant, morning);
    assert_eq!(after.reminders_today[0].status, Some(TakeStatus::Taken));
    // One taken dose out of the ten scheduled from Jan 9 through Jan 15
    assert_eq!(after.adherence_percentage, 10);

    // Changing the answer replaces the log instead of adding one
    log_service
        .record_action(1, &key, TakeStatus::Skipped, now)
        .await
        .expect("record action");
    let changed = dashboard.summary(1, now).await.expect("summary");
    assert_eq!(changed.reminders_today[0].status, Some(TakeStatus::Skipped));
    assert_eq!(changed.adherence_percentage, 0);
}

#[test_log::test(tokio::test)]
async fn action_on_another_users_reminder_is_rejected() {
    let store = store().await;
    let recorder = Arc::new(RecordingDispatcher::new());
    let morning = local(Santo_Domingo, 2025, 1, 15, 8, 0);

    ReminderDispatcher::new(Arc::clone(&store), Arc::clone(&recorder), ReminderOptions::default())
        .run_tick(morning, Some(1))
        .await
        .expect("tick");
    let key = recorder.delivered().await[0].dedup_key();

    let log_service = MedicationLogService::new(Arc::clone(&store), recorder);
    let err = log_service
        .record_action(2, &key, TakeStatus::Taken, morning)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert!(store.take_logs(1, morning, morning).await.expect("logs").is_empty());
}
