//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Heater control and power plant composition."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Heater hysteresis control and the power plant that ties the battery telemetry
//! link, both heaters and both pulse counters together.

pub mod heater;
pub mod plant;

pub use heater::{Decision, HeaterController, HeaterState, HeaterThresholds};
pub use plant::{BatteryPoll, CounterTotals, PowerPlant};
