//! ---
//! ems_section: "07-resilience-fault-tolerance"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Supervisor loop, schedule and fail-safe fault handling."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fmt;

use bsv_hal::{ClockError, TelemetryError};
use thiserror::Error;

/// Where in the supervisor a fault was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    StartupSync,
    DayPoll,
    NightPoll,
    Resync,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::StartupSync => "startup-sync",
            Phase::DayPoll => "day-poll",
            Phase::NightPoll => "night-poll",
            Phase::Resync => "resync",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaultKind {
    #[error("communication fault: {0}")]
    Comm(#[from] TelemetryError),
    #[error("clock fault: {0}")]
    Clock(#[from] ClockError),
}

impl FaultKind {
    pub fn label(&self) -> &'static str {
        match self {
            FaultKind::Comm(_) => "comm",
            FaultKind::Clock(_) => "clock",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} during {phase}")]
pub struct Fault {
    pub phase: Phase,
    #[source]
    pub kind: FaultKind,
}

impl Fault {
    pub fn new(phase: Phase, kind: impl Into<FaultKind>) -> Self {
        Self {
            phase,
            kind: kind.into(),
        }
    }
}

/// Single sticky fault flag. Once raised nothing clears it.
#[derive(Debug, Default)]
pub struct FaultFlag {
    first: Option<Fault>,
    raised: u32,
}

impl FaultFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `fault`. The first fault is the one reported at termination.
    pub fn raise(&mut self, fault: Fault) {
        self.raised += 1;
        match &self.first {
            None => {
                tracing::error!(
                    target: "bsv::core::fault",
                    phase = %fault.phase,
                    kind = fault.kind.label(),
                    error = %fault.kind,
                    "fault flag raised",
                );
                self.first = Some(fault);
            }
            Some(_) => {
                tracing::warn!(
                    target: "bsv::core::fault",
                    phase = %fault.phase,
                    kind = fault.kind.label(),
                    error = %fault.kind,
                    "additional fault while flag raised",
                );
            }
        }
    }

    pub fn is_raised(&self) -> bool {
        self.first.is_some()
    }

    pub fn fault(&self) -> Option<&Fault> {
        self.first.as_ref()
    }

    /// Number of faults recorded including the first.
    pub fn count(&self) -> u32 {
        self.raised
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_is_sticky_and_keeps_first_fault() {
        let mut flag = FaultFlag::new();
        assert!(!flag.is_raised());
        flag.raise(Fault::new(Phase::DayPoll, TelemetryError::Timeout));
        flag.raise(Fault::new(
            Phase::Resync,
            ClockError::ExternalUnreadable("bus".into()),
        ));
        assert!(flag.is_raised());
        assert_eq!(flag.count(), 2);
        let fault = flag.fault().unwrap();
        assert_eq!(fault.phase, Phase::DayPoll);
        assert_eq!(fault.kind, FaultKind::Comm(TelemetryError::Timeout));
    }

    #[test]
    fn fault_renders_phase_and_cause() {
        let fault = Fault::new(
            Phase::StartupSync,
            ClockError::LocalRejected("busy".into()),
        );
        assert_eq!(
            fault.to_string(),
            "clock fault: local clock rejected time: busy during startup-sync"
        );
    }
}
