//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Hardware collaborator contracts and value types."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use thiserror::Error;

/// Failure of a battery telemetry request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TelemetryError {
    #[error("no response from battery management unit")]
    Timeout,
    #[error("serial transport failure: {0}")]
    Transport(String),
    #[error("malformed telemetry response: {0}")]
    Malformed(String),
}

/// Failure of the local or the external real-time clock.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("external clock unreadable: {0}")]
    ExternalUnreadable(String),
    #[error("local clock rejected time: {0}")]
    LocalRejected(String),
}
