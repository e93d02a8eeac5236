//! Sensor reading domain entities
//!
//! This module defines the readings as they move through one poll cycle
//! and the snapshot handed to external consumers. It has no knowledge of
//! how readings are obtained or stored.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::maxmin::MaxMinState;

/// Timestamp format published alongside each reading
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A value straight from the sensor line, rounded to 0.1 °C
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawReading(f64);

impl RawReading {
    /// Create a raw reading, rounding to one decimal place
    pub fn new(value: f64) -> Option<Self> {
        round_tenths(value).map(Self)
    }

    /// Temperature in Celsius
    pub const fn value(&self) -> f64 {
        self.0
    }
}

/// Round to one decimal place on the exact binary value, ties to even.
///
/// `14.95` is stored as 14.9499999... and so rounds down to `14.9`; an
/// exact tie such as `12.25` goes to the even digit, `12.2`.
pub fn round_tenths(value: f64) -> Option<f64> {
    if !value.is_finite() {
        return Some(value);
    }

    // Enough places for the full expansion of any finite f64
    let exact = format!("{:.1100}", value.abs());
    let (whole, frac) = exact.split_once('.')?;
    let (tenth, rest) = (frac.get(..1)?, frac.get(1..)?);

    let mut tenths: f64 = format!("{whole}{tenth}").parse().ok()?;
    let round_up = match rest.as_bytes().split_first() {
        Some((b'6'..=b'9', _)) => true,
        Some((b'5', tail)) => tail.iter().any(|&d| d != b'0') || tenths % 2.0 == 1.0,
        _ => false,
    };
    if round_up {
        tenths += 1.0;
    }

    Some((tenths / 10.0).copysign(value))
}

/// A raw reading with its band offset applied
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibratedReading {
    /// Temperature in Celsius after calibration
    pub temperature_c: f64,
    /// The uncalibrated value it came from
    pub raw_c: f64,
    /// When calibration completed
    pub timestamp: DateTime<Utc>,
}

impl CalibratedReading {
    pub const fn new(temperature_c: f64, raw_c: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            temperature_c,
            raw_c,
            timestamp,
        }
    }

    /// Timestamp in the published ISO-8601 form
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Last accepted reading plus the max/min view at commit time.
///
/// Replaced wholesale on every accepted cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct LatestReadingSnapshot {
    pub reading: CalibratedReading,
    pub max_c: Option<f64>,
    pub min_c: Option<f64>,
    pub data_points: usize,
    /// When the cycle that produced this snapshot committed
    pub observed_at: DateTime<Utc>,
}

impl LatestReadingSnapshot {
    pub fn new(reading: CalibratedReading, state: &MaxMinState, observed_at: DateTime<Utc>) -> Self {
        Self {
            reading,
            max_c: state.max(),
            min_c: state.min(),
            data_points: state.count(),
            observed_at,
        }
    }

    /// Whole seconds since the observation; clamped at zero
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.observed_at).num_seconds().max(0)
    }

    /// Flatten into the record published by the HTTP responder
    pub fn report(&self, now: DateTime<Utc>) -> SnapshotReport {
        SnapshotReport {
            timestamp: Some(self.reading.timestamp_string()),
            obs_age: Some(self.age_secs(now)),
            temperature: Some(self.reading.temperature_c),
            max_temp_calc: self.max_c,
            min_temp_calc: self.min_c,
            data_points: Some(self.data_points),
        }
    }
}

/// Externally published view of the latest reading
///
/// Field names match what downstream consumers already read. Every field is
/// `None` before the first reading has been accepted.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SnapshotReport {
    pub timestamp: Option<String>,
    pub obs_age: Option<i64>,
    pub temperature: Option<f64>,
    pub max_temp_calc: Option<f64>,
    pub min_temp_calc: Option<f64>,
    pub data_points: Option<usize>,
}

impl SnapshotReport {
    /// Report used when no reading has been accepted yet
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
