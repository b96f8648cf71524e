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
use std::time::Duration;

use bsv_common::config::ScheduleConfig;
use bsv_common::Timestamp;
use chrono::{Datelike, Timelike};
use tokio::time::Instant;

/// Operating window derived from the hour of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Day,
    Night,
}

impl Window {
    pub fn as_str(&self) -> &'static str {
        match self {
            Window::Day => "day",
            Window::Night => "night",
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day/night boundaries, resync hour and per-window cadences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub day_start_hour: u32,
    pub day_end_hour: u32,
    pub resync_after_hour: u32,
    pub day_poll_interval: Duration,
    pub night_poll_interval: Duration,
    pub day_idle: Duration,
    pub night_idle: Duration,
}

impl Schedule {
    /// Both window bounds are inclusive.
    pub fn window(&self, hour: u32) -> Window {
        if (self.day_start_hour..=self.day_end_hour).contains(&hour) {
            Window::Day
        } else {
            Window::Night
        }
    }

    pub fn window_at(&self, now: &Timestamp) -> Window {
        self.window(now.hour())
    }

    pub fn poll_interval(&self, window: Window) -> Duration {
        match window {
            Window::Day => self.day_poll_interval,
            Window::Night => self.night_poll_interval,
        }
    }

    pub fn idle(&self, window: Window) -> Duration {
        match window {
            Window::Day => self.day_idle,
            Window::Night => self.night_idle,
        }
    }

    /// A new calendar day late enough in the evening that has not been synced yet.
    pub fn resync_due(&self, now: &Timestamp, last_sync_day: u32) -> bool {
        now.day() != last_sync_day && now.hour() > self.resync_after_hour
    }
}

impl From<&ScheduleConfig> for Schedule {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            day_start_hour: config.day_start_hour,
            day_end_hour: config.day_end_hour,
            resync_after_hour: config.resync_after_hour,
            day_poll_interval: config.day_poll_interval,
            night_poll_interval: config.night_poll_interval,
            day_idle: config.day_idle,
            night_idle: config.night_idle,
        }
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::from(&ScheduleConfig::default())
    }
}

/// Elapsed-time gate shared by telemetry polling and display refresh.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    last_cycle: Instant,
}

impl Cadence {
    pub fn starting_at(last_cycle: Instant) -> Self {
        Self { last_cycle }
    }

    pub fn last_cycle(&self) -> Instant {
        self.last_cycle
    }

    pub fn since_last(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_cycle)
    }

    /// Claim the cycle at `now` when at least `period` has passed since the last one.
    pub fn try_claim(&mut self, now: Instant, period: Duration) -> bool {
        if self.since_last(now) >= period {
            self.last_cycle = now;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 15, 0)
            .unwrap()
    }

    #[test]
    fn day_window_bounds_are_inclusive() {
        let schedule = Schedule::default();
        assert_eq!(schedule.window(7), Window::Night);
        assert_eq!(schedule.window(8), Window::Day);
        assert_eq!(schedule.window(18), Window::Day);
        assert_eq!(schedule.window(19), Window::Night);
        assert_eq!(schedule.window(0), Window::Night);
    }

    #[test]
    fn cadences_follow_window() {
        let schedule = Schedule::default();
        assert_eq!(schedule.poll_interval(Window::Day), Duration::from_secs(2));
        assert_eq!(schedule.poll_interval(Window::Night), Duration::from_secs(1));
        assert_eq!(schedule.idle(Window::Day), Duration::from_millis(100));
        assert_eq!(schedule.idle(Window::Night), Duration::from_millis(200));
    }

    #[test]
    fn resync_needs_new_day_and_late_hour() {
        let schedule = Schedule::default();
        assert!(!schedule.resync_due(&at(1, 21), 1));
        assert!(!schedule.resync_due(&at(2, 19), 1));
        assert!(schedule.resync_due(&at(2, 20), 1));
        assert!(!schedule.resync_due(&at(2, 3), 1));
    }

    #[tokio::test(start_paused = true)]
    async fn cadence_claims_once_per_period() {
        let start = Instant::now();
        let mut cadence = Cadence::starting_at(start);
        assert!(!cadence.try_claim(start + Duration::from_millis(1_999), Duration::from_secs(2)));
        assert!(cadence.try_claim(start + Duration::from_secs(2), Duration::from_secs(2)));
        assert_eq!(cadence.last_cycle(), start + Duration::from_secs(2));
        assert!(!cadence.try_claim(start + Duration::from_secs(3), Duration::from_secs(2)));
    }
}
