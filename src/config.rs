//! Service configuration
//!
//! One explicit struct, built once at start-up and handed to the pieces that
//! need it. Values come from the environment of the container the logger
//! runs in; anything unset keeps its default.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveTime;

use crate::adapters::serial_link::SerialSettings;
use crate::domain::validation::DEFAULT_MAX_DELTA_C;
use crate::error::ConfigError;

/// Configuration for the logger process
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceConfig {
    /// Serial device the sensor is attached to
    pub serial_port: String,
    pub serial_baud: u32,
    /// Longest wait for one response line
    pub read_timeout: Duration,
    /// Time between poll commands
    pub poll_interval: Duration,
    /// Largest accepted change between consecutive readings (°C, exclusive)
    pub max_temp_diff: f64,
    /// INI file holding the `[CALIBRATION]` section
    pub calibration_path: PathBuf,
    /// Where the max/min list is persisted
    pub state_path: PathBuf,
    /// UTC time of day the max/min list is cleared
    pub reset_time: NaiveTime,
    /// When false the process exits without polling
    pub enabled: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            serial_port: "/dev/ttyUSB0".to_string(),
            serial_baud: 115_200,
            read_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(60), // 1 minute
            max_temp_diff: DEFAULT_MAX_DELTA_C,
            calibration_path: PathBuf::from("/data/config.ini"),
            state_path: PathBuf::from("/usr/src/app/temps.bin"),
            reset_time: default_reset_time(),
            enabled: true,
        }
    }
}

/// 09:01 UTC, just after the climatological day boundary
fn default_reset_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 1, 0).unwrap_or(NaiveTime::MIN)
}

impl ServiceConfig {
    /// Config for a bench setup: files in the working directory
    pub fn local() -> Self {
        Self {
            calibration_path: PathBuf::from("config.ini"),
            state_path: PathBuf::from("temps.bin"),
            ..Self::default()
        }
    }

    /// Read overrides from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Apply overrides from `lookup` on top of the defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().with_overrides(lookup)
    }

    /// Apply environment overrides on top of this config
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from `lookup` on top of this config
    pub fn with_overrides<F>(self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self;

        if let Some(port) = lookup("HMT333_PORT") {
            config.serial_port = port;
        }
        if let Some(v) = lookup("HMT333_BAUD") {
            config.serial_baud = parse_var("HMT333_BAUD", &v)?;
        }
        if let Some(v) = lookup("HMT333_TIMEOUT") {
            let secs: u64 = parse_var("HMT333_TIMEOUT", &v)?;
            if secs == 0 {
                return Err(invalid("HMT333_TIMEOUT", &v));
            }
            config.read_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = lookup("DATA_POLL_INTERVAL") {
            let secs: u64 = parse_var("DATA_POLL_INTERVAL", &v)?;
            if secs == 0 {
                return Err(invalid("DATA_POLL_INTERVAL", &v));
            }
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(v) = lookup("MAX_TEMP_DIFF") {
            let diff: f64 = parse_var("MAX_TEMP_DIFF", &v)?;
            if !(diff.is_finite() && diff > 0.0) {
                return Err(invalid("MAX_TEMP_DIFF", &v));
            }
            config.max_temp_diff = diff;
        }
        if let Some(path) = lookup("HMT333_CONFIG") {
            config.calibration_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("HMT333_STATE") {
            config.state_path = PathBuf::from(path);
        }
        if let Some(v) = lookup("MAXMIN_RESET_UTC") {
            config.reset_time = NaiveTime::parse_from_str(v.trim(), "%H:%M")
                .map_err(|_| invalid("MAXMIN_RESET_UTC", &v))?;
        }
        if let Some(v) = lookup("HMT333_ENABLE") {
            config.enabled = v.trim().eq_ignore_ascii_case("true");
        }

        Ok(config)
    }

    /// Serial link settings derived from this config
    pub fn serial_settings(&self) -> SerialSettings {
        SerialSettings {
            port: self.serial_port.clone(),
            baud: self.serial_baud,
            timeout: self.read_timeout,
        }
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(var, value))
}

fn invalid(var: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = ServiceConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.max_temp_diff, 7.0);
        assert_eq!(config.reset_time, NaiveTime::from_hms_opt(9, 1, 0).unwrap());
    }

    #[test]
    fn environment_overrides() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("HMT333_PORT", "/dev/ttyS1"),
            ("HMT333_BAUD", "4800"),
            ("DATA_POLL_INTERVAL", "30"),
            ("MAX_TEMP_DIFF", "5.5"),
            ("MAXMIN_RESET_UTC", "21:01"),
            ("HMT333_ENABLE", "false"),
        ]))
        .unwrap();

        assert_eq!(config.serial_port, "/dev/ttyS1");
        assert_eq!(config.serial_baud, 4800);
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.max_temp_diff, 5.5);
        assert_eq!(config.reset_time, NaiveTime::from_hms_opt(21, 1, 0).unwrap());
        assert!(!config.enabled);
    }

    #[test]
    fn malformed_values_name_the_variable() {
        let err = ServiceConfig::from_lookup(lookup_from(&[("HMT333_BAUD", "fast")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "HMT333_BAUD",
                value: "fast".into()
            }
        );

        assert!(ServiceConfig::from_lookup(lookup_from(&[("DATA_POLL_INTERVAL", "0")])).is_err());
        assert_eq!(
            ServiceConfig::from_lookup(lookup_from(&[("HMT333_TIMEOUT", "0")])).unwrap_err(),
            ConfigError::Invalid {
                var: "HMT333_TIMEOUT",
                value: "0".into()
            }
        );
        assert!(ServiceConfig::from_lookup(lookup_from(&[("MAX_TEMP_DIFF", "-1")])).is_err());
        assert!(ServiceConfig::from_lookup(lookup_from(&[("MAXMIN_RESET_UTC", "9am")])).is_err());
    }

    #[test]
    fn local_preset_keeps_env_overrides() {
        let config = ServiceConfig::local()
            .with_overrides(lookup_from(&[("HMT333_STATE", "/tmp/t.bin")]))
            .unwrap();
        assert_eq!(config.calibration_path, PathBuf::from("config.ini"));
        assert_eq!(config.state_path, PathBuf::from("/tmp/t.bin"));
    }
}
