//! HMT333 Temperature Logger Library
//!
//! This library acquires temperature readings from a serial-attached
//! HMT333 sensor, validates and calibrates them, and keeps a crash-resilient
//! rolling daily max/min.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                                 │
//! │  - Line parser, reading validator                               │
//! │  - CalibrationTable (9 bands)                                   │
//! │  - MaxMinState, LatestReadingSnapshot                           │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Ports (Traits)                               │
//! │  - SensorLink: request one response line                        │
//! │  - CalibrationSource: load the current offset table             │
//! │  - StatePort: persist/restore the max/min list                  │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Adapters                                     │
//! │  - SerialLink: serialport                                       │
//! │  - CalibrationFile: INI key/value file                          │
//! │  - StateFile: versioned postcard file                           │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Service                                      │
//! │  - Poller: fixed-rate poll cycle                                │
//! │  - MaxMinTracker, LatestReadingStore                            │
//! │  - Daily reset task                                             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Data flow per cycle:
//! `SensorLink::request` → [`protocol::classify`] → [`domain::parser`] →
//! calibration → [`domain::validation`] → tracker update + snapshot commit.

pub mod config;
pub mod error;
pub mod protocol;

/// Domain layer - pure business logic
pub mod domain;

/// Ports - traits defining boundaries
pub mod ports;

/// Adapters - concrete implementations
pub mod adapters;

/// Service layer - the running pipeline
pub mod service;

pub use config::ServiceConfig;
pub use error::{CycleError, LinkError, ParseError, PersistenceError, ValidationError};

// Re-export key domain types
pub use domain::{
    CalibratedReading, CalibrationTable, LatestReadingSnapshot, MaxMinState, RawReading,
    SnapshotReport,
};

// Re-export key port traits
pub use ports::{CalibrationSource, SensorLink, StatePort};

// Re-export adapters
pub use adapters::{CalibrationFile, SerialLink, StateFile};

pub use service::{CycleOutcome, LatestReadingStore, MaxMinTracker, Poller};
