//! Error taxonomy
//!
//! Every error here is contained within one poll cycle (or one persistence
//! call). None of them is allowed to stop the polling process.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for serial link operations
#[derive(Debug, Error)]
pub enum LinkError {
    /// Port could not be opened
    #[error("failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
    /// No complete line arrived within the read timeout
    #[error("timed out waiting for a response line")]
    Timeout,
    /// Read or write failed
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Link has not been opened (or was dropped after a fatal error)
    #[error("serial link is not connected")]
    NotConnected,
}

/// Error type for extracting the temperature from a response line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no numeric value in response line")]
    NoValue,
    #[error("expected one numeric value, found {0}")]
    Ambiguous(usize),
}

/// A calibrated value that failed one of the two plausibility checks
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ValidationError {
    /// Value outside the open interval (-60, 60) °C
    #[error("temperature {value} outside sane range ({min}, {max})")]
    Sanity { value: f64, min: f64, max: f64 },
    /// Jump versus the previously accepted value is too large
    #[error("temperature jump {previous} -> {value} is not below {max_delta}")]
    Consistency {
        previous: f64,
        value: f64,
        max_delta: f64,
    },
}

/// Error type for loading the calibration table
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("cannot read calibration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("calibration file has no [CALIBRATION] section")]
    MissingSection,
}

/// Error type for max/min state persistence
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("state file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("state file is not a max/min record (bad magic)")]
    BadMagic,
    #[error("unsupported state file version {0}")]
    UnsupportedVersion(u8),
    #[error("state file payload invalid: {0}")]
    Corrupt(#[from] postcard::Error),
}

/// Error type for building a [`ServiceConfig`](crate::ServiceConfig)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

/// Why a poll cycle produced no accepted reading
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
