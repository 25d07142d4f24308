//! Per-minute reminder loop.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use remedi_service::reminder::{NotificationDispatcher, ReminderDispatcher, ScheduleRepository};

/// Start of the minute after `now`.
#[must_use]
pub fn next_minute(now: DateTime<Utc>) -> DateTime<Utc> {
    now.duration_trunc(TimeDelta::minutes(1))
        .unwrap_or(now)
        + TimeDelta::minutes(1)
}

/// Oldest missed minutes are dropped beyond this many after a stall.
pub const MAX_CATCH_UP_MINUTES: usize = 60;

/// ## Summary
/// Minute boundaries after `last` up to and including `now`, oldest first.
#[must_use]
pub fn due_boundaries(last: DateTime<Utc>, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let mut boundaries = Vec::new();
    let mut boundary = next_minute(last);
    while boundary <= now {
        boundaries.push(boundary);
        boundary += TimeDelta::minutes(1);
    }
    boundaries
}

/// ## Summary
/// Runs one reminder tick for every minute boundary until `shutdown`
/// resolves. Each tick is evaluated at its boundary, not at the time the
/// process woke up; minutes missed while the loop was stalled are ticked in
/// order on the next wake. A failed tick is logged and the loop continues.
pub async fn run_until<R, D>(
    dispatcher: &ReminderDispatcher<R, D>,
    shutdown: impl Future<Output = ()>,
) where
    R: ScheduleRepository,
    D: NotificationDispatcher,
{
    tokio::pin!(shutdown);
    tracing::info!("Reminder scheduler started");

    let mut last = Utc::now();
    loop {
        let boundary = next_minute(last);
        let wait = (boundary - Utc::now()).to_std().unwrap_or_default();

        tokio::select! {
            () = &mut shutdown => {
                tracing::info!("Reminder scheduler stopping");
                break;
            }
            () = tokio::time::sleep(wait) => {
                let due = due_boundaries(last, Utc::now().max(boundary));
                let stale = due.len().saturating_sub(MAX_CATCH_UP_MINUTES);
                if due.len() > 1 {
                    tracing::warn!(
                        minutes = due.len(),
                        skipped = stale,
                        "Catching up on missed reminder minutes"
                    );
                }

                for at in due.into_iter().skip(stale) {
                    last = at;
                    if let Err(err) = dispatcher.run_tick(at, None).await {
                        tracing::error!(at = %at, error = %err, "Reminder tick failed");
                    }
                }
            }
        }
    }
}
