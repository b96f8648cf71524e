//! ---
//! ems_section: "11-simulation-test-harness"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Simulated bench collaborators and scenario replay."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::sync::Arc;

use bsv_hal::{BatteryReading, ModeToggle, StatusDisplay};
use parking_lot::Mutex;
use tracing::info;

/// One rendered screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Live(BatteryReading),
    Offline,
    FatalError,
}

/// Display that records every screen instead of drawing it.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    screens: Arc<Mutex<Vec<Screen>>>,
    toggle: ModeToggle,
    echo: bool,
}

impl RecordingDisplay {
    pub fn new(toggle: ModeToggle) -> Self {
        Self {
            screens: Arc::default(),
            toggle,
            echo: false,
        }
    }

    /// Also log every rendered screen at info level.
    pub fn echoing(mut self) -> Self {
        self.echo = true;
        self
    }

    pub fn toggle(&self) -> &ModeToggle {
        &self.toggle
    }

    pub fn screens(&self) -> Vec<Screen> {
        self.screens.lock().clone()
    }

    pub fn last(&self) -> Option<Screen> {
        self.screens.lock().last().copied()
    }

    fn render(&self, screen: Screen) {
        if self.echo {
            match &screen {
                Screen::Live(reading) => info!(screen = %reading, "display"),
                Screen::Offline => info!(screen = "offline", "display"),
                Screen::FatalError => info!(screen = "fatal error", "display"),
            }
        }
        self.screens.lock().push(screen);
    }
}

impl StatusDisplay for RecordingDisplay {
    fn show(&mut self, reading: &BatteryReading) {
        self.render(Screen::Live(*reading));
    }

    fn show_offline(&mut self) {
        self.render(Screen::Offline);
    }

    fn show_fatal_error(&mut self) {
        self.render(Screen::FatalError);
    }

    fn offline_mode_requested(&self) -> bool {
        self.toggle.is_requested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_screens_in_order() {
        let mut display = RecordingDisplay::new(ModeToggle::new());
        let probe = display.clone();
        let reading = BatteryReading::new(45.0, -10.0, 48.2);
        display.show(&reading);
        display.show_offline();
        display.show_fatal_error();
        assert_eq!(
            probe.screens(),
            vec![Screen::Live(reading), Screen::Offline, Screen::FatalError]
        );
        assert_eq!(probe.last(), Some(Screen::FatalError));
    }

    #[test]
    fn offline_request_follows_the_button() {
        let button = ModeToggle::new();
        let display = RecordingDisplay::new(button.clone());
        assert!(!display.offline_mode_requested());
        button.press();
        assert!(display.offline_mode_requested());
    }
}
