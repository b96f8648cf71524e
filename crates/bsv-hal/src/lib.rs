//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Hardware collaborator contracts and value types."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Contracts between the supervisor and the hardware it drives: the serial
//! telemetry link, both real-time clocks, heater outputs, pulse counters and the
//! front-panel display.

pub mod clock;
pub mod counter;
pub mod display;
pub mod error;
pub mod frame;
pub mod output;
pub mod reading;
pub mod telemetry;

pub use clock::{ExternalClock, LocalClock};
pub use counter::PulseCounter;
pub use display::{ModeToggle, StatusDisplay};
pub use error::{ClockError, TelemetryError};
pub use frame::RequestFrame;
pub use output::DigitalOutput;
pub use reading::BatteryReading;
pub use telemetry::TelemetryLink;
