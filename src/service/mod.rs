//! Service layer - wires ports and domain into the running pipeline

pub mod latest;
pub mod poller;
pub mod schedule;
pub mod tracker;

pub use latest::LatestReadingStore;
pub use poller::{CycleOutcome, Poller};
pub use schedule::{next_reset_after, run_daily};
pub use tracker::{MaxMinTracker, FRESHNESS_SECS};
