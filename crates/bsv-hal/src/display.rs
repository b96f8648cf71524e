//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Hardware collaborator contracts and value types."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

use crate::reading::BatteryReading;

/// Front panel: the LCD plus the operator's mode button.
pub trait StatusDisplay: Send {
    /// Render live battery values.
    fn show(&mut self, reading: &BatteryReading);

    /// Render the idle screen used at night while telemetry is not polled.
    fn show_offline(&mut self);

    /// Render the terminal fault screen.
    fn show_fatal_error(&mut self);

    /// Whether the operator asked for telemetry polling during the night.
    fn offline_mode_requested(&self) -> bool;
}

/// Latched on/off request flipped by a push button.
///
/// The button handler holds one clone and calls [`ModeToggle::press`]; the display
/// reads the latched state from another.
#[derive(Debug, Clone, Default)]
pub struct ModeToggle {
    requested: Arc<AtomicBool>,
}

impl ModeToggle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the request and return the new state.
    pub fn press(&self) -> bool {
        let requested = !self.requested.fetch_xor(true, Ordering::AcqRel);
        info!(offline_telemetry = requested, "mode button pressed");
        requested
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_latches_and_releases() {
        let toggle = ModeToggle::new();
        let button = toggle.clone();
        assert!(!toggle.is_requested());
        assert!(button.press());
        assert!(toggle.is_requested());
        assert!(!button.press());
        assert!(!toggle.is_requested());
    }
}
