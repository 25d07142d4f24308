//! ReMedi reminder workspace - integration test support.
//!
//! Re-exports the workspace crates so integration tests use one set of
//! `remedi_test::` paths, plus a few dataset builders shared across tests.

pub use remedi_app as app;
pub use remedi_core as model;
pub use remedi_recurrence::recurrence;
pub use remedi_service as service;

pub mod fixtures {
    use chrono::{NaiveDate, NaiveTime};
    use remedi_core::types::{Medication, User};
    use remedi_recurrence::recurrence::Schedule;
    use remedi_service::reminder::Dataset;

    /// Dataset builder keyed by user; medications get ids `user * 10 + n`.
    #[derive(Debug, Default)]
    pub struct DatasetBuilder {
        dataset: Dataset,
    }

    impl DatasetBuilder {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        #[must_use]
        pub fn user(mut self, id: i64, timezone: Option<&str>) -> Self {
            self.dataset.users.push(User {
                id,
                name: format!("user-{id}"),
                timezone: timezone.map(str::to_string),
            });
            self
        }

        #[must_use]
        pub fn medication(mut self, id: i64, user_id: i64, name: &str, dosage: Option<&str>) -> Self {
            self.dataset.medications.push(Medication {
                id,
                user_id,
                name: name.to_string(),
                dosage: dosage.map(str::to_string),
                instructions: None,
            });
            self
        }

        #[must_use]
        pub fn schedule(mut self, schedule: Schedule) -> Self {
            self.dataset.schedules.push(schedule);
            self
        }

        #[must_use]
        pub fn build(self) -> Dataset {
            self.dataset
        }
    }

    /// # Panics
    /// Panics on an invalid calendar date.
    #[must_use]
    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| panic!("invalid date {year}-{month}-{day}"))
    }

    /// # Panics
    /// Panics on an invalid wall-clock time.
    #[must_use]
    pub fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_else(|| panic!("invalid time {hour}:{minute}"))
    }
}
