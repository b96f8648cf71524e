//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the supervisor runtime."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::time::Duration;

use chrono::{NaiveDateTime, TimeDelta};

/// Wall-clock reading as kept by the real-time clocks (no time zone).
pub type Timestamp = NaiveDateTime;

/// Milliseconds by which `actual` overran `expected`; negative when early.
pub fn overrun_ms(actual: Duration, expected: Duration) -> i64 {
    let actual_ms = actual.as_secs_f64() * 1_000.0;
    let expected_ms = expected.as_secs_f64() * 1_000.0;
    (actual_ms - expected_ms).round() as i64
}

/// Stretch a monotonic duration by `factor` into a wall-clock delta.
pub fn scaled(elapsed: Duration, factor: f64) -> TimeDelta {
    let micros = (elapsed.as_secs_f64() * factor * 1_000_000.0).round();
    TimeDelta::microseconds(micros.min(i64::MAX as f64) as i64)
}
