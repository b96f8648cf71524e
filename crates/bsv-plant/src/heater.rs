//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Heater control and power plant composition."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fmt;

use bsv_common::config::HeaterConfig;
use bsv_hal::DigitalOutput;
use tracing::info;

/// Output level of a heater.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaterState {
    On,
    Off,
}

impl HeaterState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaterState::On => "on",
            HeaterState::Off => "off",
        }
    }
}

impl fmt::Display for HeaterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the thresholds ask for given one battery reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    SwitchOn,
    SwitchOff,
    /// Inside the hysteresis band: keep whatever the output is doing.
    Hold,
}

/// Switching thresholds of one heater.
///
/// Low state of charge and low current are independent activation triggers.
/// Deactivation needs both high state of charge and high current. The two SOC
/// thresholds may be configured in either order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaterThresholds {
    pub activate_soc: f64,
    pub deactivate_soc: f64,
    pub min_current: f64,
    pub max_current: f64,
}

impl HeaterThresholds {
    pub fn new(activate_soc: f64, deactivate_soc: f64, min_current: f64, max_current: f64) -> Self {
        Self {
            activate_soc,
            deactivate_soc,
            min_current,
            max_current,
        }
    }

    /// Activation wins when both conditions hold at once.
    pub fn decide(&self, soc: f64, current: f64) -> Decision {
        if soc <= self.activate_soc || current <= self.min_current {
            Decision::SwitchOn
        } else if soc >= self.deactivate_soc && current >= self.max_current {
            Decision::SwitchOff
        } else {
            Decision::Hold
        }
    }
}

impl From<&HeaterConfig> for HeaterThresholds {
    fn from(config: &HeaterConfig) -> Self {
        Self::new(
            config.activate_soc,
            config.deactivate_soc,
            config.min_current,
            config.max_current,
        )
    }
}

/// Hysteresis switch driving one heater output.
///
/// Holds no state of its own: the level last written to the output is the
/// heater state.
#[derive(Debug)]
pub struct HeaterController<O> {
    name: &'static str,
    thresholds: HeaterThresholds,
    output: O,
}

impl<O: DigitalOutput> HeaterController<O> {
    /// Take over `output` and drive it low.
    pub fn new(name: &'static str, thresholds: HeaterThresholds, mut output: O) -> Self {
        output.set_low();
        Self {
            name,
            thresholds,
            output,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn thresholds(&self) -> &HeaterThresholds {
        &self.thresholds
    }

    pub fn state(&self) -> HeaterState {
        if self.output.is_set_high() {
            HeaterState::On
        } else {
            HeaterState::Off
        }
    }

    /// Re-evaluate the thresholds against a fresh reading.
    pub fn apply(&mut self, soc: f64, current: f64) -> HeaterState {
        match self.thresholds.decide(soc, current) {
            Decision::SwitchOn => self.drive(HeaterState::On, soc, current),
            Decision::SwitchOff => self.drive(HeaterState::Off, soc, current),
            Decision::Hold => {}
        }
        self.state()
    }

    /// Force the output off regardless of thresholds.
    pub fn stop(&mut self) {
        if self.state() == HeaterState::On {
            info!(heater = self.name, "heater stopped");
        }
        self.output.set_low();
    }

    fn drive(&mut self, target: HeaterState, soc: f64, current: f64) {
        let previous = self.state();
        match target {
            HeaterState::On => self.output.set_high(),
            HeaterState::Off => self.output.set_low(),
        }
        if previous != target {
            info!(
                heater = self.name,
                from = %previous,
                to = %target,
                soc,
                current,
                "heater switched"
            );
        }
    }
}
