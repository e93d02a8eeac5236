//! Temperature calibration domain service
//!
//! The sensor's calibration certificate gives a correction at each of
//! -30/-20/-10/0/10/20/30/40/50 °C. Each correction covers a 10 °C band
//! centred on its point; a raw value picks its band by comparing against
//! the band floors from the highest down, so a value sitting exactly on a
//! boundary belongs to the band above it.

use chrono::NaiveDate;

/// Calibration band, named after the certificate point it covers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Band {
    M30,
    M20,
    M10,
    Zero,
    P10,
    P20,
    P30,
    P40,
    P50,
}

impl Band {
    /// All bands, coldest first
    pub const ALL: [Band; 9] = [
        Band::M30,
        Band::M20,
        Band::M10,
        Band::Zero,
        Band::P10,
        Band::P20,
        Band::P30,
        Band::P40,
        Band::P50,
    ];

    /// Band floors checked from the top down; anything below the last is `M30`
    const FLOORS: [(f64, Band); 8] = [
        (45.0, Band::P50),
        (35.0, Band::P40),
        (25.0, Band::P30),
        (15.0, Band::P20),
        (5.0, Band::P10),
        (-5.0, Band::Zero),
        (-15.0, Band::M10),
        (-25.0, Band::M20),
    ];

    /// Band containing `temp_c`
    pub fn for_temperature(temp_c: f64) -> Band {
        Self::FLOORS
            .iter()
            .find(|(floor, _)| temp_c >= *floor)
            .map(|(_, band)| *band)
            .unwrap_or(Band::M30)
    }

    /// Configuration key holding this band's correction
    pub const fn key(&self) -> &'static str {
        match self {
            Band::M30 => "corr_M30",
            Band::M20 => "corr_M20",
            Band::M10 => "corr_M10",
            Band::Zero => "corr_0",
            Band::P10 => "corr_10",
            Band::P20 => "corr_20",
            Band::P30 => "corr_30",
            Band::P40 => "corr_40",
            Band::P50 => "corr_50",
        }
    }

    /// Look up a band by configuration key (case-insensitive)
    pub fn from_key(key: &str) -> Option<Band> {
        Self::ALL
            .iter()
            .copied()
            .find(|band| band.key().eq_ignore_ascii_case(key))
    }

    const fn index(&self) -> usize {
        *self as usize
    }
}

/// Per-band additive corrections plus certificate details
///
/// Built fresh from the calibration source on every application; an
/// all-zero table is the identity calibration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CalibrationTable {
    offsets: [f64; 9],
    /// Instrument serial number from the certificate
    pub serial_no: Option<String>,
    /// Date the next calibration is due, as entered in the settings page
    pub calibration_date: Option<String>,
}

impl CalibrationTable {
    /// Identity calibration
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build a table from offsets listed coldest band first
    pub fn from_offsets(offsets: [f64; 9]) -> Self {
        Self {
            offsets,
            ..Self::default()
        }
    }

    pub fn offset(&self, band: Band) -> f64 {
        self.offsets[band.index()]
    }

    pub fn set_offset(&mut self, band: Band, offset: f64) {
        self.offsets[band.index()] = offset;
    }

    pub fn is_identity(&self) -> bool {
        self.offsets.iter().all(|o| *o == 0.0)
    }

    /// Add the matching band's correction to a raw temperature
    #[inline]
    pub fn apply(&self, raw_c: f64) -> f64 {
        raw_c + self.offset(Band::for_temperature(raw_c))
    }

    /// Whether the instrument is due for recalibration on `today`.
    ///
    /// A blank date means no due date was entered. Dates are accepted as
    /// `YYYY/MM/DD` or `YYYY-MM-DD`; an unparsable date reports `None`.
    pub fn recalibration_due(&self, today: NaiveDate) -> Option<bool> {
        let date = match self.calibration_date.as_deref().map(str::trim) {
            None | Some("") => return Some(false),
            Some(date) => date,
        };

        NaiveDate::parse_from_str(date, "%Y/%m/%d")
            .or_else(|_| NaiveDate::parse_from_str(date, "%Y-%m-%d"))
            .ok()
            .map(|due| today >= due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distinct_table() -> CalibrationTable {
        // Offsets are unique per band so the chosen band is visible in the result
        CalibrationTable::from_offsets([-0.9, -0.8, -0.7, -0.6, -0.5, 0.5, 0.6, 0.7, 0.8])
    }

    #[test]
    fn band_edges_belong_to_the_band_above() {
        assert_eq!(Band::for_temperature(45.0), Band::P50);
        assert_eq!(Band::for_temperature(35.0), Band::P40);
        assert_eq!(Band::for_temperature(25.0), Band::P30);
        assert_eq!(Band::for_temperature(15.0), Band::P20);
        assert_eq!(Band::for_temperature(5.0), Band::P10);
        assert_eq!(Band::for_temperature(-5.0), Band::Zero);
        assert_eq!(Band::for_temperature(-15.0), Band::M10);
        assert_eq!(Band::for_temperature(-25.0), Band::M20);
    }

    #[test]
    fn values_just_below_edges_fall_to_the_band_below() {
        assert_eq!(Band::for_temperature(44.9), Band::P40);
        assert_eq!(Band::for_temperature(34.9), Band::P30);
        assert_eq!(Band::for_temperature(24.9), Band::P20);
        assert_eq!(Band::for_temperature(14.9), Band::P10);
        assert_eq!(Band::for_temperature(4.9), Band::Zero);
        assert_eq!(Band::for_temperature(-5.1), Band::M10);
        assert_eq!(Band::for_temperature(-15.1), Band::M20);
        assert_eq!(Band::for_temperature(-25.1), Band::M30);
        assert_eq!(Band::for_temperature(-59.9), Band::M30);
    }

    #[test]
    fn apply_adds_band_offset() {
        let table = distinct_table();
        assert!((table.apply(45.0) - 45.8).abs() < 1e-9);
        assert!((table.apply(20.0) - 20.5).abs() < 1e-9);
        assert!((table.apply(-5.0) - (-5.6)).abs() < 1e-9);
        assert!((table.apply(-30.0) - (-30.9)).abs() < 1e-9);
    }

    #[test]
    fn zero_table_is_identity() {
        let table = CalibrationTable::zero();
        assert!(table.is_identity());
        assert_eq!(table.apply(12.3), 12.3);
    }

    #[test]
    fn keys_round_trip() {
        for band in Band::ALL {
            assert_eq!(Band::from_key(band.key()), Some(band));
        }
        assert_eq!(Band::from_key("CORR_m30"), Some(Band::M30));
        assert_eq!(Band::from_key("corr_60"), None);
    }

    #[test]
    fn recalibration_due_dates() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut table = CalibrationTable::zero();
        assert_eq!(table.recalibration_due(today), Some(false));

        table.calibration_date = Some(" ".into());
        assert_eq!(table.recalibration_due(today), Some(false));

        table.calibration_date = Some("2024/06/01".into());
        assert_eq!(table.recalibration_due(today), Some(true));

        table.calibration_date = Some("2025-01-31".into());
        assert_eq!(table.recalibration_due(today), Some(false));

        table.calibration_date = Some("next year".into());
        assert_eq!(table.recalibration_due(today), None);
    }
}
