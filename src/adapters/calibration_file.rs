//! Calibration file adapter
//!
//! Reads the `[CALIBRATION]` section of the INI file shared with the
//! settings page:
//!
//! ```ini
//! [CALIBRATION]
//! serial_no = E123456
//! calibration_date = 2025/03/01
//! corr_M30 = 0.1
//! corr_M20 = 0.0
//! ...
//! corr_50 = -0.2
//! ```
//!
//! A missing key, or a value that is not a number, counts as `0.0` for that
//! band. The file is never written from here.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::{Band, CalibrationTable};
use crate::error::CalibrationError;
use crate::ports::calibration::CalibrationSource;

/// Section holding the band corrections
pub const CALIBRATION_SECTION: &str = "CALIBRATION";

/// INI-file calibration source
#[derive(Clone, Debug)]
pub struct CalibrationFile {
    path: PathBuf,
}

impl CalibrationFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CalibrationSource for CalibrationFile {
    fn load(&self) -> Result<CalibrationTable, CalibrationError> {
        let text = fs::read_to_string(&self.path).map_err(|source| CalibrationError::Read {
            path: self.path.clone(),
            source,
        })?;
        parse_calibration(&text)
    }
}

/// Build a table from the text of a calibration file
pub fn parse_calibration(text: &str) -> Result<CalibrationTable, CalibrationError> {
    let entries = section_entries(text, CALIBRATION_SECTION).ok_or(CalibrationError::MissingSection)?;
    let mut table = CalibrationTable::zero();

    for (key, value) in entries {
        if let Some(band) = Band::from_key(key) {
            match value.parse::<f64>() {
                Ok(offset) if offset.is_finite() => table.set_offset(band, offset),
                _ => info!(key, value, "ignoring unparsable calibration offset"),
            }
        } else if key.eq_ignore_ascii_case("serial_no") {
            table.serial_no = Some(value.to_string());
        } else if key.eq_ignore_ascii_case("calibration_date") {
            table.calibration_date = Some(value.to_string());
        } else {
            debug!(key, "unknown calibration key");
        }
    }

    Ok(table)
}

/// `key = value` pairs of one section; `None` if the section is absent.
///
/// Section names match exactly, keys keep their case. `;` and `#` start
/// comment lines. `key: value` is accepted as well.
fn section_entries<'a>(text: &'a str, section: &str) -> Option<Vec<(&'a str, &'a str)>> {
    let mut in_section = false;
    let mut found = false;
    let mut entries = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = name.trim() == section;
            found |= in_section;
            continue;
        }

        if !in_section {
            continue;
        }

        if let Some(idx) = line.find(['=', ':']) {
            let (key, value) = line.split_at(idx);
            entries.push((key.trim(), value[1..].trim()));
        }
    }

    found.then_some(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[WOW]
site_id =
wow_enable = false

[CALIBRATION]
serial_no = E123456
calibration_date = 2025/03/01
corr_m30 = 0.3
corr_M20 = -0.2
corr_0 = 0.1
corr_20 = not-a-number
; corr_50 = 9.9
corr_50 = -0.4
";

    #[test]
    fn parses_offsets_and_certificate_details() {
        let table = parse_calibration(SAMPLE).unwrap();
        assert_eq!(table.offset(Band::M30), 0.3);
        assert_eq!(table.offset(Band::M20), -0.2);
        assert_eq!(table.offset(Band::Zero), 0.1);
        assert_eq!(table.offset(Band::P50), -0.4);
        assert_eq!(table.serial_no.as_deref(), Some("E123456"));
        assert_eq!(table.calibration_date.as_deref(), Some("2025/03/01"));
    }

    #[test]
    fn missing_or_bad_keys_are_zero() {
        let table = parse_calibration(SAMPLE).unwrap();
        assert_eq!(table.offset(Band::P20), 0.0);
        assert_eq!(table.offset(Band::P40), 0.0);
        assert_eq!(table.offset(Band::M10), 0.0);
    }

    #[test]
    fn missing_section_is_an_error() {
        assert!(matches!(
            parse_calibration("[WOW]\nsite_id = 1\n"),
            Err(CalibrationError::MissingSection)
        ));
    }

    #[test]
    fn missing_file_falls_back_to_identity() {
        let source = CalibrationFile::new(std::env::temp_dir().join("hmt-logger-no-such-config.ini"));
        assert!(source.load().is_err());
        assert!(source.current().is_identity());
    }

    #[test]
    fn file_is_reread_on_every_call() {
        let path = std::env::temp_dir().join(format!("hmt-logger-cal-{}.ini", std::process::id()));
        let source = CalibrationFile::new(&path);

        fs::write(&path, "[CALIBRATION]\ncorr_20 = 0.5\n").unwrap();
        assert_eq!(source.current().apply(20.0), 20.5);

        fs::write(&path, "[CALIBRATION]\ncorr_20 = -0.5\n").unwrap();
        assert_eq!(source.current().apply(20.0), 19.5);

        fs::remove_file(&path).unwrap();
    }
}
