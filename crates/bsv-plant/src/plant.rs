//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Heater control and power plant composition."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::time::Duration;

use bsv_hal::{
    BatteryReading, DigitalOutput, PulseCounter, RequestFrame, TelemetryError, TelemetryLink,
};
use tracing::{debug, warn};

use crate::heater::{HeaterController, HeaterState};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(1);

/// Outcome of one telemetry poll.
///
/// On failure `reading` is zero-valued and must not be used for control.
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryPoll {
    pub reading: BatteryReading,
    pub fault: Option<TelemetryError>,
}

impl BatteryPoll {
    pub fn is_fault(&self) -> bool {
        self.fault.is_some()
    }

    pub fn into_result(self) -> Result<BatteryReading, TelemetryError> {
        match self.fault {
            Some(err) => Err(err),
            None => Ok(self.reading),
        }
    }
}

/// Pulses drained from both counters by [`PowerPlant::zero_counters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterTotals {
    pub l1: u64,
    pub l2: u64,
}

/// Telemetry link, both heaters and both pulse counters of the installation.
#[derive(Debug)]
pub struct PowerPlant<L, O> {
    link: L,
    request_timeout: Duration,
    heater: HeaterController<O>,
    tank: HeaterController<O>,
    counter_l1: PulseCounter,
    counter_l2: PulseCounter,
}

impl<L, O> PowerPlant<L, O>
where
    L: TelemetryLink,
    O: DigitalOutput,
{
    pub fn new(
        link: L,
        heater: HeaterController<O>,
        tank: HeaterController<O>,
        counter_l1: PulseCounter,
        counter_l2: PulseCounter,
    ) -> Self {
        Self {
            link,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            heater,
            tank,
            counter_l1,
            counter_l2,
        }
    }

    /// Bound every telemetry request by `timeout`.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Poll the battery management unit once.
    pub async fn read_battery_parameters(&mut self, frame: &RequestFrame) -> BatteryPoll {
        let response = tokio::time::timeout(self.request_timeout, self.link.request(frame))
            .await
            .unwrap_or(Err(TelemetryError::Timeout))
            .and_then(BatteryReading::checked);
        match response {
            Ok(reading) => {
                debug!(
                    soc = reading.soc,
                    current = reading.current,
                    voltage = reading.voltage,
                    "battery parameters read"
                );
                BatteryPoll {
                    reading,
                    fault: None,
                }
            }
            Err(err) => {
                warn!(error = %err, frame = %frame, "battery telemetry failed");
                BatteryPoll {
                    reading: BatteryReading::default(),
                    fault: Some(err),
                }
            }
        }
    }

    /// Feed the same battery-wide reading to both heaters.
    pub fn set_heaters(&mut self, reading: &BatteryReading) {
        self.heater.apply(reading.soc, reading.current);
        self.tank.apply(reading.soc, reading.current);
    }

    /// Reset both pulse counters and report what they had accumulated.
    pub fn zero_counters(&self) -> CounterTotals {
        CounterTotals {
            l1: self.counter_l1.reset(),
            l2: self.counter_l2.reset(),
        }
    }

    pub fn heaters_all_stop(&mut self) {
        self.heater.stop();
        self.tank.stop();
    }

    /// Current `(heater, tank)` output levels.
    pub fn heater_states(&self) -> (HeaterState, HeaterState) {
        (self.heater.state(), self.tank.state())
    }

    pub fn heater(&self) -> &HeaterController<O> {
        &self.heater
    }

    pub fn tank(&self) -> &HeaterController<O> {
        &self.tank
    }
}
