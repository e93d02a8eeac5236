//! Reading plausibility checks
//!
//! A calibrated value must pass both checks before it may touch shared
//! state. Either failure discards the whole cycle.

use crate::error::ValidationError;

/// Lower sanity bound (exclusive), °C
pub const SANE_MIN_C: f64 = -60.0;

/// Upper sanity bound (exclusive), °C
pub const SANE_MAX_C: f64 = 60.0;

/// Default maximum change between consecutive accepted readings, °C
pub const DEFAULT_MAX_DELTA_C: f64 = 7.0;

/// Sanity and consistency checks for calibrated readings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReadingValidator {
    /// Consecutive accepted readings must differ by strictly less than this
    pub max_delta_c: f64,
}

impl Default for ReadingValidator {
    fn default() -> Self {
        Self {
            max_delta_c: DEFAULT_MAX_DELTA_C,
        }
    }
}

impl ReadingValidator {
    pub const fn new(max_delta_c: f64) -> Self {
        Self { max_delta_c }
    }

    /// Value must lie strictly inside (-60, 60). An absent value passes.
    pub fn check_sanity(&self, value: Option<f64>) -> Result<(), ValidationError> {
        match value {
            Some(v) if !(v > SANE_MIN_C && v < SANE_MAX_C) => Err(ValidationError::Sanity {
                value: v,
                min: SANE_MIN_C,
                max: SANE_MAX_C,
            }),
            _ => Ok(()),
        }
    }

    /// `|value - previous|` must be strictly below `max_delta_c`.
    /// Passes when there is no previous accepted value.
    pub fn check_consistency(&self, previous: Option<f64>, value: f64) -> Result<(), ValidationError> {
        match previous {
            Some(prev) if !((value - prev).abs() < self.max_delta_c) => {
                Err(ValidationError::Consistency {
                    previous: prev,
                    value,
                    max_delta: self.max_delta_c,
                })
            }
            _ => Ok(()),
        }
    }

    /// Run both checks
    pub fn validate(&self, previous: Option<f64>, value: f64) -> Result<(), ValidationError> {
        self.check_sanity(Some(value))?;
        self.check_consistency(previous, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanity_bounds_are_exclusive() {
        let v = ReadingValidator::default();
        assert!(v.check_sanity(Some(-61.0)).is_err());
        assert!(v.check_sanity(Some(-60.0)).is_err());
        assert!(v.check_sanity(Some(-59.9)).is_ok());
        assert!(v.check_sanity(Some(59.9)).is_ok());
        assert!(v.check_sanity(Some(60.0)).is_err());
        assert!(v.check_sanity(None).is_ok());
    }

    #[test]
    fn nan_is_not_sane() {
        assert!(ReadingValidator::default().check_sanity(Some(f64::NAN)).is_err());
    }

    #[test]
    fn consistency_against_previous() {
        let v = ReadingValidator::new(7.0);
        assert_eq!(
            v.check_consistency(Some(10.0), 20.0),
            Err(ValidationError::Consistency {
                previous: 10.0,
                value: 20.0,
                max_delta: 7.0
            })
        );
        assert!(v.check_consistency(Some(10.0), 15.0).is_ok());
        assert!(v.check_consistency(Some(10.0), 3.0).is_err());
        assert!(v.check_consistency(None, 55.0).is_ok());
    }

    #[test]
    fn delta_equal_to_limit_is_rejected() {
        let v = ReadingValidator::new(7.0);
        assert!(v.check_consistency(Some(10.0), 17.0).is_err());
        assert!(v.check_consistency(Some(10.0), 16.9).is_ok());
    }

    #[test]
    fn validate_runs_sanity_first() {
        let v = ReadingValidator::default();
        assert!(matches!(
            v.validate(Some(59.0), 61.0),
            Err(ValidationError::Sanity { .. })
        ));
    }
}
