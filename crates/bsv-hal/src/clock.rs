//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Hardware collaborator contracts and value types."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use bsv_common::Timestamp;

use crate::error::ClockError;

/// Clock of the controller itself; drifts and is corrected from the reference.
pub trait LocalClock: Send {
    fn now(&self) -> Timestamp;

    fn set(&mut self, time: Timestamp) -> Result<(), ClockError>;
}

/// Battery-backed reference clock chip on the I2C bus.
pub trait ExternalClock: Send {
    fn read(&mut self) -> Result<Timestamp, ClockError>;
}
