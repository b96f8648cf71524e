//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the supervisor runtime."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Shared primitives for the battery heater supervisor workspace.
//! This crate exposes configuration loading, logging setup and wall-clock helpers
//! consumed across the workspace.

pub mod config;
pub mod logging;
pub mod time;

pub use config::{
    AppConfig, CountersConfig, HeaterConfig, HeatersConfig, LoadedAppConfig, LoggingConfig,
    ScheduleConfig, SimulationConfig, TelemetryConfig,
};
pub use logging::{init_tracing, LogFormat};
pub use time::Timestamp;
