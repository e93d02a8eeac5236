//! Calibration port - where the band corrections come from
//!
//! The table is owned by the settings-page collaborator. This core only
//! reads it, and re-reads it on every application so edits take effect on
//! the next cycle.

use tracing::info;

use crate::domain::CalibrationTable;
use crate::error::CalibrationError;

/// Port for loading the current calibration table
pub trait CalibrationSource: Send + Sync {
    /// Read the table as it is right now
    fn load(&self) -> Result<CalibrationTable, CalibrationError>;

    /// Read the table, falling back to identity calibration on any error
    fn current(&self) -> CalibrationTable {
        match self.load() {
            Ok(table) => table,
            Err(e) => {
                info!(error = %e, "calibration unavailable, using zero offsets");
                CalibrationTable::zero()
            }
        }
    }
}

/// A fixed table is its own source
impl CalibrationSource for CalibrationTable {
    fn load(&self) -> Result<CalibrationTable, CalibrationError> {
        Ok(self.clone())
    }
}
