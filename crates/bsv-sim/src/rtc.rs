//! ---
//! ems_section: "11-simulation-test-harness"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Simulated bench collaborators and scenario replay."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bsv_common::time::scaled;
use bsv_common::Timestamp;
use bsv_hal::{ClockError, ExternalClock, LocalClock};
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Wall-clock time that advances with the tokio clock, stretched by `time_scale`.
#[derive(Debug)]
struct Ticking {
    base: Timestamp,
    anchor: Instant,
    time_scale: f64,
}

impl Ticking {
    fn new(start: Timestamp, time_scale: f64) -> Self {
        Self {
            base: start,
            anchor: Instant::now(),
            time_scale,
        }
    }

    fn now(&self) -> Timestamp {
        self.base + scaled(self.anchor.elapsed(), self.time_scale)
    }

    fn set(&mut self, time: Timestamp) {
        self.base = time;
        self.anchor = Instant::now();
    }
}

/// Microcontroller clock. Clones share the same time.
#[derive(Debug, Clone)]
pub struct SimulatedRtc {
    inner: Arc<Mutex<Ticking>>,
    reject_writes: Arc<AtomicBool>,
}

impl SimulatedRtc {
    pub fn new(start: Timestamp, time_scale: f64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Ticking::new(start, time_scale))),
            reject_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Jump to `time` without going through [`LocalClock::set`].
    pub fn warp(&self, time: Timestamp) {
        self.inner.lock().set(time);
    }

    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::Release);
    }
}

impl LocalClock for SimulatedRtc {
    fn now(&self) -> Timestamp {
        self.inner.lock().now()
    }

    fn set(&mut self, time: Timestamp) -> Result<(), ClockError> {
        if self.reject_writes.load(Ordering::Acquire) {
            return Err(ClockError::LocalRejected(format!(
                "write of {time} refused"
            )));
        }
        self.inner.lock().set(time);
        debug!(%time, "local clock set");
        Ok(())
    }
}

/// Battery-backed reference clock chip. Clones share time and fault state.
#[derive(Debug, Clone)]
pub struct SimulatedExternalClock {
    inner: Arc<Mutex<Ticking>>,
    failing: Arc<AtomicBool>,
}

impl SimulatedExternalClock {
    pub fn new(start: Timestamp, time_scale: f64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Ticking::new(start, time_scale))),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn warp(&self, time: Timestamp) {
        self.inner.lock().set(time);
    }

    /// Make subsequent reads fail until cleared.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }
}

impl ExternalClock for SimulatedExternalClock {
    fn read(&mut self) -> Result<Timestamp, ClockError> {
        if self.failing.load(Ordering::Acquire) {
            return Err(ClockError::ExternalUnreadable(
                "no acknowledge on I2C bus".to_owned(),
            ));
        }
        Ok(self.inner.lock().now())
    }
}
