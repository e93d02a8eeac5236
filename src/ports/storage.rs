//! Storage port - abstraction for persisting the max/min list
//!
//! This trait allows the tracker to survive restarts without knowing
//! where the list lives (state file, memory for tests).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// The max/min list as written to durable storage
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// When this record was written (Unix seconds, UTC)
    pub written_at: i64,
    /// Accepted calibrated values, oldest first
    pub values: Vec<f64>,
}

impl PersistedState {
    pub fn new(written_at: DateTime<Utc>, values: &[f64]) -> Self {
        Self {
            written_at: written_at.timestamp(),
            values: values.to_vec(),
        }
    }

    /// Seconds between the write and `now`; negative if the clock went back
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp() - self.written_at
    }
}

/// Port for persisting the max/min list
///
/// Every accepted reading results in a full `save`, so implementations
/// must leave either the old or the new record on disk, never a mix.
pub trait StatePort: Send {
    /// Read the last saved record; `Ok(None)` when nothing is saved
    fn load(&mut self) -> Result<Option<PersistedState>, PersistenceError>;

    /// Replace the saved record
    fn save(&mut self, state: &PersistedState) -> Result<(), PersistenceError>;

    /// Delete the saved record; deleting nothing is not an error
    fn clear(&mut self) -> Result<(), PersistenceError>;
}

/// In-memory state port (for tests and for running without a state file)
#[derive(Clone, Debug, Default)]
pub struct MemoryState {
    pub record: Option<PersistedState>,
    pub saves: usize,
}

impl MemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: PersistedState) -> Self {
        Self {
            record: Some(record),
            saves: 0,
        }
    }
}

impl StatePort for MemoryState {
    fn load(&mut self) -> Result<Option<PersistedState>, PersistenceError> {
        Ok(self.record.clone())
    }

    fn save(&mut self, state: &PersistedState) -> Result<(), PersistenceError> {
        self.record = Some(state.clone());
        self.saves += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PersistenceError> {
        self.record = None;
        Ok(())
    }
}
