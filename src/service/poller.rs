//! Polling loop
//!
//! One cycle: request a line, classify it, parse, calibrate, validate
//! against the last accepted value, then update the tracker and replace
//! the latest snapshot.
//!
//! Ticks fall on a fixed-rate grid and each cycle runs on its own worker
//! thread, so a slow sensor never pushes later polls back. Overlap policy:
//! the link is taken with `try_lock`, and a tick that finds the previous
//! cycle still holding it is rejected as [`CycleOutcome::Busy`]. The commit
//! step (consistency check, tracker update, snapshot swap) runs under the
//! tracker mutex, which makes commits linearizable.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::{parse_line, CalibratedReading, LatestReadingSnapshot, ReadingValidator};
use crate::error::CycleError;
use crate::ports::{CalibrationSource, SensorLink, StatePort};
use crate::protocol::{classify, ResponseLine};
use crate::service::latest::LatestReadingStore;
use crate::service::tracker::MaxMinTracker;

/// Result of one poll cycle
#[derive(Debug)]
pub enum CycleOutcome {
    /// Reading passed every check and was committed
    Accepted(LatestReadingSnapshot),
    /// Sensor echoed our command; `echo off` was re-sent
    EchoReset,
    /// Sensor confirmed echo is off
    EchoConfirmed,
    /// Empty, short, or unmarked line
    NoData,
    /// Link, parse, or validation failure; nothing was committed
    Rejected(CycleError),
    /// Previous cycle still owns the link; this tick was skipped
    Busy,
}

impl CycleOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CycleOutcome::Accepted(_))
    }
}

/// Drives the acquisition pipeline
pub struct Poller<L, C, S>
where
    L: SensorLink,
    C: CalibrationSource,
    S: StatePort,
{
    link: Mutex<L>,
    calibration: C,
    validator: ReadingValidator,
    tracker: Mutex<MaxMinTracker<S>>,
    latest: Arc<LatestReadingStore>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<L, C, S> Poller<L, C, S>
where
    L: SensorLink,
    C: CalibrationSource,
    S: StatePort,
{
    pub fn new(link: L, calibration: C, validator: ReadingValidator, tracker: MaxMinTracker<S>) -> Self {
        Self {
            link: Mutex::new(link),
            calibration,
            validator,
            tracker: Mutex::new(tracker),
            latest: Arc::new(LatestReadingStore::new()),
        }
    }

    /// Read-only handle for external consumers
    pub fn latest_store(&self) -> Arc<LatestReadingStore> {
        Arc::clone(&self.latest)
    }

    /// Run one full cycle
    pub fn run_cycle(&self) -> CycleOutcome {
        let line = {
            let mut link = match self.link.try_lock() {
                Ok(link) => link,
                Err(TryLockError::WouldBlock) => {
                    warn!("previous poll still waiting for the sensor, skipping this one");
                    return CycleOutcome::Busy;
                }
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            };

            let line = match link.request() {
                Ok(line) => line,
                Err(e) => {
                    warn!(endpoint = link.endpoint(), error = %e, "no response from sensor");
                    return CycleOutcome::Rejected(e.into());
                }
            };
            let kind = classify(&line);
            info!(line = %line, kind = kind.as_str(), "raw data");

            match kind {
                ResponseLine::EchoedCommand => {
                    info!("command echoed by sensor, switching echo off");
                    if let Err(e) = link.disable_echo() {
                        warn!(error = %e, "failed to send echo off");
                    }
                    return CycleOutcome::EchoReset;
                }
                ResponseLine::EchoConfirmed => {
                    info!("echo confirmation, skipping");
                    return CycleOutcome::EchoConfirmed;
                }
                ResponseLine::NoData => {
                    warn!(line = %line, "response has no temperature data");
                    return CycleOutcome::NoData;
                }
                ResponseLine::Reading(_) => {}
            }
            line
        };

        match self.process_line(&line) {
            Ok(snapshot) => CycleOutcome::Accepted(snapshot),
            Err(e) => {
                warn!(line = %line, error = %e, "reading discarded");
                CycleOutcome::Rejected(e)
            }
        }
    }

    /// Parse, calibrate, validate and commit one temperature line
    pub fn process_line(&self, line: &str) -> Result<LatestReadingSnapshot, CycleError> {
        let raw = parse_line(line)?;
        debug!(raw = raw.value(), "decoded temperature");

        let calibrated = self.calibration.current().apply(raw.value());
        let reading = CalibratedReading::new(calibrated, raw.value(), Utc::now());

        let mut tracker = lock(&self.tracker);
        let previous = self.latest.latest_temperature();
        self.validator.validate(previous, reading.temperature_c)?;

        let observed_at = Utc::now();
        let state = tracker.update(reading.temperature_c, observed_at);
        let snapshot = LatestReadingSnapshot::new(reading, state, observed_at);
        self.latest.commit(snapshot.clone());

        info!(
            temperature = snapshot.reading.temperature_c,
            max = ?snapshot.max_c,
            min = ?snapshot.min_c,
            data_points = snapshot.data_points,
            timestamp = %snapshot.reading.timestamp_string(),
            "reading accepted"
        );
        Ok(snapshot)
    }

    /// Daily max/min reset
    pub fn reset_maxmin(&self) {
        lock(&self.tracker).reset();
    }

    /// Current number of values in the max/min list
    pub fn data_points(&self) -> usize {
        lock(&self.tracker).state().count()
    }
}

impl<L, C, S> Poller<L, C, S>
where
    L: SensorLink + 'static,
    C: CalibrationSource + 'static,
    S: StatePort + 'static,
{
    /// Poll every `interval` until `shutdown` fires or its sender is dropped.
    ///
    /// Tick times come from the previous tick, not from when a cycle
    /// finishes. If the loop falls more than one interval behind, missed
    /// ticks are skipped.
    pub fn run(self: Arc<Self>, interval: Duration, shutdown: &Receiver<()>) {
        info!(interval_secs = interval.as_secs_f64(), "polling started");
        let mut next_tick = Instant::now();

        loop {
            let poller = Arc::clone(&self);
            let spawned = thread::Builder::new()
                .name("hmt-poll".into())
                .spawn(move || {
                    poller.run_cycle();
                });
            if let Err(e) = spawned {
                warn!(error = %e, "could not start poll worker");
            }

            next_tick = next_deadline(next_tick, interval, Instant::now());
            let wait = next_tick.saturating_duration_since(Instant::now());
            match shutdown.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        info!("polling stopped");
    }
}

/// Next tick on the fixed-rate grid after `previous`, skipping any that
/// are already in the past at `now`
fn next_deadline(previous: Instant, interval: Duration, now: Instant) -> Instant {
    let next = previous + interval;
    if next > now || interval.is_zero() {
        return next;
    }

    let behind = now.duration_since(next).as_nanos();
    let skipped = u32::try_from(behind / interval.as_nanos() + 1).unwrap_or(u32::MAX);
    warn!(skipped, "poll loop fell behind, skipping missed ticks");
    next + interval.saturating_mul(skipped)
}
