pub mod engine;
pub mod occurrence;
pub mod rule;
pub mod schedule;
pub mod series;
pub mod timezone;

pub use engine::{
    DEFAULT_MAX_STEPS, EngineOptions, RecurrenceEngine, is_due_at, occurrences_in_range,
};
pub use occurrence::Occurrence;
pub use rule::{Rule, Step, WeekdaySet};
pub use schedule::{FrequencyKind, Schedule};
pub use series::{Cursor, DoseSeries};
pub use timezone::{end_of_day, localize, parse_timezone, start_of_day, truncate_to_minute};
