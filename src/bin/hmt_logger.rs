//! HMT333 logger service
//!
//! Polls the sensor on a fixed interval, keeps the daily max/min and
//! persists it across restarts. Configuration comes from the environment
//! (see `ServiceConfig::from_env`); `RUST_LOG` sets the log filter.
//!
//! ## Usage
//!
//! ```bash
//! # List available serial ports
//! cargo run --bin hmt_logger -- --list-ports
//!
//! # Run against the port from HMT333_PORT (default /dev/ttyUSB0)
//! cargo run --bin hmt_logger
//!
//! # Override the port
//! cargo run --bin hmt_logger -- --port /dev/ttyUSB1
//!
//! # Bench run: calibration and state files in the working directory
//! cargo run --bin hmt_logger -- --local --port /dev/ttyACM0
//! ```

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use hmt_logger::adapters::serial_link::available_ports;
use hmt_logger::domain::ReadingValidator;
use hmt_logger::service::run_daily;
use hmt_logger::{
    CalibrationFile, CalibrationSource, MaxMinTracker, Poller, SerialLink, ServiceConfig, StateFile,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--list-ports") {
        return list_ports();
    }

    let base = if args.iter().any(|a| a == "--local") {
        ServiceConfig::local()
    } else {
        ServiceConfig::default()
    };
    let mut config = base.with_env().context("invalid configuration")?;

    if let Some(idx) = args.iter().position(|a| a == "--port") {
        match args.get(idx + 1) {
            Some(port) => config.serial_port = port.clone(),
            None => bail!("--port needs a value"),
        }
    }

    if !config.enabled {
        info!("HMT333 logging disabled, exiting");
        return Ok(());
    }

    info!(
        port = %config.serial_port,
        baud = config.serial_baud,
        interval_secs = config.poll_interval.as_secs(),
        max_temp_diff = config.max_temp_diff,
        "starting HMT333 logger"
    );

    // A missing sensor is not fatal; the link retries on every cycle
    let link = match SerialLink::open(config.serial_settings()) {
        Ok(link) => link,
        Err(e) => {
            warn!(error = %e, "sensor not reachable yet, will retry each poll");
            SerialLink::new(config.serial_settings())
        }
    };

    let calibration = CalibrationFile::new(&config.calibration_path);
    let table = calibration.current();
    if let Some(serial_no) = &table.serial_no {
        info!(serial_no = %serial_no, "calibration loaded");
    }
    match table.recalibration_due(Utc::now().date_naive()) {
        Some(true) => warn!(due = ?table.calibration_date, "sensor is due for recalibration"),
        Some(false) => {}
        None => info!(date = ?table.calibration_date, "calibration date not understood"),
    }

    let tracker = MaxMinTracker::restore(StateFile::new(&config.state_path), Utc::now());
    let validator = ReadingValidator::new(config.max_temp_diff);
    let poller = Arc::new(Poller::new(link, calibration, validator, tracker));

    // Senders live for the whole process; dropping them stops the loops
    let (_reset_stop, reset_rx) = mpsc::channel::<()>();
    let (_poll_stop, poll_rx) = mpsc::channel::<()>();

    let reset_at = config.reset_time;
    let resetter = Arc::clone(&poller);
    thread::Builder::new()
        .name("hmt-reset".into())
        .spawn(move || run_daily(reset_at, &reset_rx, || resetter.reset_maxmin()))
        .context("could not start daily reset task")?;

    Arc::clone(&poller).run(config.poll_interval, &poll_rx);

    error!("poll loop exited");
    Ok(())
}

fn list_ports() -> Result<()> {
    let ports = available_ports().context("could not enumerate serial ports")?;
    println!("Available serial ports:");
    if ports.is_empty() {
        println!("  (none)");
    }
    for port in ports {
        println!("  {}", port);
    }
    Ok(())
}
