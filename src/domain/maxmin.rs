//! Rolling max/min accumulation
//!
//! Holds every accepted calibrated value since the last daily reset.
//! `max`/`min` are derived from the list on each push so that a restored
//! list always yields the same view as the live one did.

/// Accepted values since the last reset, with derived max/min/count
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaxMinState {
    values: Vec<f64>,
    max: Option<f64>,
    min: Option<f64>,
}

impl MaxMinState {
    pub const fn new() -> Self {
        Self {
            values: Vec::new(),
            max: None,
            min: None,
        }
    }

    /// Rebuild from a previously persisted list
    pub fn from_values(values: Vec<f64>) -> Self {
        let mut state = Self {
            values,
            max: None,
            min: None,
        };
        state.recompute();
        state
    }

    /// Append one accepted value
    pub fn push(&mut self, value: f64) {
        self.values.push(value);
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.max = None;
        self.min = None;
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    fn recompute(&mut self) {
        self.max = self.values.iter().copied().reduce(f64::max);
        self.min = self.values.iter().copied().reduce(f64::min);
    }
}
