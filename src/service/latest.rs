//! Latest reading store
//!
//! Holds the one snapshot external readers (the HTTP responder) see. The
//! snapshot is swapped as a whole under a write lock, so a reader gets
//! either the previous snapshot or the new one.

use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::domain::{LatestReadingSnapshot, SnapshotReport};

/// Shared holder of the most recent accepted reading
#[derive(Debug, Default)]
pub struct LatestReadingStore {
    snapshot: RwLock<Option<LatestReadingSnapshot>>,
}

impl LatestReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot
    pub fn commit(&self, snapshot: LatestReadingSnapshot) {
        let mut slot = self.snapshot.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(snapshot);
    }

    /// Copy of the current snapshot, if any reading has been accepted
    pub fn latest(&self) -> Option<LatestReadingSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Calibrated temperature of the current snapshot
    pub fn latest_temperature(&self) -> Option<f64> {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map(|s| s.reading.temperature_c)
    }

    /// Published view, all-empty before the first accepted reading
    pub fn report(&self, now: DateTime<Utc>) -> SnapshotReport {
        self.latest()
            .map(|s| s.report(now))
            .unwrap_or_else(SnapshotReport::empty)
    }
}
