//! ---
//! ems_section: "07-resilience-fault-tolerance"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Supervisor loop, schedule and fail-safe fault handling."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Supervisory loop for the heated battery installation: day/night schedule,
//! clock synchronisation and the sticky fault flag that drives fail-safe shutdown.

pub mod clock_link;
pub mod fault;
pub mod schedule;
pub mod supervisor;

pub use clock_link::ClockLink;
pub use fault::{Fault, FaultFlag, FaultKind, Phase};
pub use schedule::{Cadence, Schedule, Window};
pub use supervisor::{Bookkeeping, IterationReport, Supervisor, SupervisorState, Termination};
