//! Domain layer - pure business logic independent of infrastructure
//!
//! This module contains the core domain entities and services: turning a
//! response line into a reading, calibrating it, checking it, and
//! accumulating the daily max/min.

pub mod calibration;
pub mod maxmin;
pub mod parser;
pub mod reading;
pub mod validation;

pub use calibration::{Band, CalibrationTable};
pub use maxmin::MaxMinState;
pub use parser::parse_line;
pub use reading::{CalibratedReading, LatestReadingSnapshot, RawReading, SnapshotReport};
pub use validation::ReadingValidator;
