//! ---
//! ems_section: "11-simulation-test-harness"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Simulated bench collaborators and scenario replay."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Host implementations of every hardware collaborator so the supervisor can run
//! and be tested without the battery installation attached.

pub mod bms;
pub mod display;
pub mod gpio;
pub mod replay;
pub mod rtc;

pub use bms::{RequestCounter, SimulatedBms};
pub use display::{RecordingDisplay, Screen};
pub use gpio::{spawn_pulse_source, SimOutput};
pub use replay::{ReplayEngine, ScenarioFrame};
pub use rtc::{SimulatedExternalClock, SimulatedRtc};
