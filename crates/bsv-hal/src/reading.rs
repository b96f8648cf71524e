//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Hardware collaborator contracts and value types."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TelemetryError;

/// Battery-wide values decoded from one telemetry response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BatteryReading {
    /// State of charge in percent.
    pub soc: f64,
    /// Pack current in amperes, negative while discharging.
    pub current: f64,
    /// Pack voltage in volts.
    pub voltage: f64,
}

impl BatteryReading {
    pub const fn new(soc: f64, current: f64, voltage: f64) -> Self {
        Self {
            soc,
            current,
            voltage,
        }
    }

    /// Reject readings no sane battery management unit would report.
    pub fn checked(self) -> Result<Self, TelemetryError> {
        if !(self.soc.is_finite() && (0.0..=100.0).contains(&self.soc)) {
            return Err(TelemetryError::Malformed(format!(
                "state of charge {} outside 0..=100",
                self.soc
            )));
        }
        if !self.current.is_finite() || !self.voltage.is_finite() {
            return Err(TelemetryError::Malformed(
                "non-finite current or voltage".to_owned(),
            ));
        }
        Ok(self)
    }
}

impl fmt::Display for BatteryReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SOC {:.0}% {:+.1}A {:.1}V",
            self.soc, self.current, self.voltage
        )
    }
}
