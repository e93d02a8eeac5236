//! Ports (interfaces) defining the boundaries of the application
//!
//! Ports are traits that define how the domain interacts with external systems.
//! They allow the domain to remain independent of specific implementations.
//!
//! - **SensorLink**: How we poll the sensor (serial port, mock)
//! - **CalibrationSource**: Where band corrections come from (config file, fixed table)
//! - **StatePort**: How the max/min list survives restarts (state file, memory)

pub mod calibration;
pub mod link;
pub mod storage;

pub use calibration::CalibrationSource;
pub use link::SensorLink;
pub use storage::{MemoryState, PersistedState, StatePort};
