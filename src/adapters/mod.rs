//! Adapters - concrete implementations of ports
//!
//! Adapters connect the domain to the outside world by implementing
//! the port traits. Each adapter knows how to work with a specific
//! technology.
//!
//! # Available Adapters
//!
//! - **serial_link**: HMT333 over a local serial port
//! - **calibration_file**: INI calibration file shared with the settings page
//! - **state_file**: versioned max/min list on local disk

pub mod calibration_file;
pub mod serial_link;
pub mod state_file;

pub use calibration_file::CalibrationFile;
pub use serial_link::SerialLink;
pub use state_file::StateFile;
