//! Daily max/min reset schedule
//!
//! The max/min window runs from one reset to the next at a fixed UTC time
//! of day. The reset task sleeps on the shutdown channel so it can be
//! stopped between resets.

use std::sync::mpsc::{Receiver, RecvTimeoutError};

use chrono::{DateTime, Days, NaiveTime, Utc};
use tracing::{debug, info};

/// First instant strictly after `now` whose UTC time of day is `at`
pub fn next_reset_after(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(at).and_utc();
    if today > now {
        today
    } else {
        now.date_naive()
            .checked_add_days(Days::new(1))
            .map(|d| d.and_time(at).and_utc())
            .unwrap_or(today)
    }
}

/// Call `reset` every day at `at` (UTC) until `shutdown` fires or its
/// sender is dropped.
pub fn run_daily<F>(at: NaiveTime, shutdown: &Receiver<()>, mut reset: F)
where
    F: FnMut(),
{
    let mut due = next_reset_after(Utc::now(), at);
    info!(next = %due, "daily max/min reset scheduled");

    loop {
        let now = Utc::now();
        if now >= due {
            reset();
            due = next_reset_after(now, at);
            info!(next = %due, "daily max/min reset done");
            continue;
        }

        // Sleep in bounded steps so wall-clock adjustments are picked up
        let wait = (due - now)
            .to_std()
            .unwrap_or_default()
            .min(std::time::Duration::from_secs(60));
        debug!(wait_secs = wait.as_secs(), "waiting for reset");

        match shutdown.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}
