//! ---
//! ems_section: "11-simulation-test-harness"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Simulated bench collaborators and scenario replay."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bsv_hal::{DigitalOutput, PulseCounter};
use tokio::task::JoinHandle;
use tracing::trace;

/// Output pin whose level and write count are visible through clones.
#[derive(Debug, Clone, Default)]
pub struct SimOutput {
    pin: u8,
    level: Arc<AtomicBool>,
    writes: Arc<AtomicU64>,
}

impl SimOutput {
    pub fn new(pin: u8) -> Self {
        Self {
            pin,
            ..Self::default()
        }
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn is_high(&self) -> bool {
        self.level.load(Ordering::Acquire)
    }

    /// Number of `set_high`/`set_low` calls seen so far.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Acquire)
    }

    fn write(&self, high: bool) {
        self.writes.fetch_add(1, Ordering::AcqRel);
        let previous = self.level.swap(high, Ordering::AcqRel);
        if previous != high {
            trace!(pin = self.pin, high, "output level changed");
        }
    }
}

impl DigitalOutput for SimOutput {
    fn set_high(&mut self) {
        self.write(true);
    }

    fn set_low(&mut self) {
        self.write(false);
    }

    fn is_set_high(&self) -> bool {
        self.is_high()
    }
}

/// Feed `counter` one pulse every `interval`, like an energy meter's S0 output.
pub fn spawn_pulse_source(counter: PulseCounter, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            counter.increment();
        }
    })
}
