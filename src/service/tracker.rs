//! Max/min tracker
//!
//! Wraps [`MaxMinState`] with durability: the full list is saved after
//! every accepted value, restored at start-up if it is fresh, and wiped at
//! the daily reset. Persistence failures are logged and otherwise ignored;
//! the in-memory state keeps serving.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::MaxMinState;
use crate::ports::storage::{PersistedState, StatePort};

/// A persisted list older than this (seconds) is discarded at start-up
pub const FRESHNESS_SECS: i64 = 1800;

/// Daily max/min accumulator with a durable backing store
pub struct MaxMinTracker<S: StatePort> {
    state: MaxMinState,
    store: S,
}

impl<S: StatePort> MaxMinTracker<S> {
    /// Start empty, discarding anything already persisted
    pub fn empty(mut store: S) -> Self {
        if let Err(e) = store.clear() {
            warn!(error = %e, "could not delete persisted max/min list");
        }
        Self {
            state: MaxMinState::new(),
            store,
        }
    }

    /// Restore the persisted list if it was written less than
    /// [`FRESHNESS_SECS`] before `now`; otherwise start empty and delete it.
    /// A record stamped after `now` cannot be aged and counts as stale.
    pub fn restore(mut store: S, now: DateTime<Utc>) -> Self {
        match store.load() {
            Ok(Some(record)) if (0..FRESHNESS_SECS).contains(&record.age_secs(now)) => {
                let state = MaxMinState::from_values(record.values);
                info!(
                    data_points = state.count(),
                    max = ?state.max(),
                    min = ?state.min(),
                    "previous temperatures list loaded"
                );
                Self { state, store }
            }
            Ok(Some(record)) => {
                info!(age_secs = record.age_secs(now), "persisted temperatures list is stale, discarding");
                Self::empty(store)
            }
            Ok(None) => {
                info!("no persisted temperatures list, starting empty");
                Self::empty(store)
            }
            Err(e) => {
                warn!(error = %e, "persisted temperatures list unreadable, discarding");
                Self::empty(store)
            }
        }
    }

    /// Record one accepted value and persist the whole list
    pub fn update(&mut self, value: f64, now: DateTime<Utc>) -> &MaxMinState {
        self.state.push(value);
        let record = PersistedState::new(now, self.state.values());
        if let Err(e) = self.store.save(&record) {
            warn!(error = %e, "failed to persist temperatures list");
        }
        &self.state
    }

    /// Clear the list and delete the persisted copy
    pub fn reset(&mut self) {
        let dropped = self.state.count();
        self.state.clear();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to delete persisted temperatures list");
        }
        info!(dropped, "max/min list reset");
    }

    pub fn state(&self) -> &MaxMinState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StateFile;
    use crate::ports::storage::MemoryState;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn every_update_is_persisted() {
        let mut tracker = MaxMinTracker::restore(MemoryState::new(), t0());
        tracker.update(5.0, t0());
        tracker.update(7.0, t0());

        assert_eq!(tracker.store().saves, 2);
        let record = tracker.store().record.clone().unwrap();
        assert_eq!(record.values, vec![5.0, 7.0]);
        assert_eq!(record.written_at, t0().timestamp());
    }

    #[test]
    fn fresh_record_is_restored() {
        let written = t0();
        let store = MemoryState::with_record(PersistedState::new(written, &[4.0, 9.5, -1.0]));
        let tracker = MaxMinTracker::restore(store, written + Duration::seconds(1000));

        assert_eq!(tracker.state().count(), 3);
        assert_eq!(tracker.state().max(), Some(9.5));
        assert_eq!(tracker.state().min(), Some(-1.0));
        assert!(tracker.store().record.is_some());
    }

    #[test]
    fn stale_record_is_discarded_and_deleted() {
        let written = t0();
        let store = MemoryState::with_record(PersistedState::new(written, &[4.0, 9.5]));
        let tracker = MaxMinTracker::restore(store, written + Duration::seconds(1900));

        assert_eq!(tracker.state().count(), 0);
        assert_eq!(tracker.state().max(), None);
        assert!(tracker.store().record.is_none());
    }

    #[test]
    fn record_from_the_future_is_stale() {
        let written = t0();
        let store = MemoryState::with_record(PersistedState::new(written, &[4.0, 9.5]));
        // Clock booted behind the last write
        let tracker = MaxMinTracker::restore(store, written - Duration::seconds(3600));

        assert_eq!(tracker.state().count(), 0);
        assert!(tracker.store().record.is_none());
    }

    #[test]
    fn reset_clears_and_restarts_count() {
        let mut tracker = MaxMinTracker::restore(MemoryState::new(), t0());
        tracker.update(10.0, t0());
        tracker.update(12.0, t0());

        tracker.reset();
        assert_eq!(tracker.state().count(), 0);
        assert!(tracker.store().record.is_none());

        let state = tracker.update(8.5, t0());
        assert_eq!(state.count(), 1);
        assert_eq!(state.max(), Some(8.5));
        assert_eq!(state.min(), Some(8.5));
    }

    #[test]
    fn state_file_survives_restart() {
        let path = std::env::temp_dir().join(format!("hmt-logger-tracker-{}.bin", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let mut tracker = MaxMinTracker::restore(StateFile::new(&path), t0());
        for v in [5.0, 7.0, 3.0] {
            tracker.update(v, t0());
        }
        drop(tracker);

        let restored = MaxMinTracker::restore(StateFile::new(&path), t0() + Duration::seconds(1000));
        assert_eq!(restored.state().values(), &[5.0, 7.0, 3.0]);
        drop(restored);

        let stale = MaxMinTracker::restore(StateFile::new(&path), t0() + Duration::seconds(1900));
        assert_eq!(stale.state().count(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_file_is_discarded() {
        let path = std::env::temp_dir().join(format!("hmt-logger-corrupt-{}.bin", std::process::id()));
        std::fs::write(&path, b"\x80\x04pickle").unwrap();

        let tracker = MaxMinTracker::restore(StateFile::new(&path), t0());
        assert_eq!(tracker.state().count(), 0);
        assert!(!path.exists());
    }
}
