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

use bsv_common::time::overrun_ms;
use bsv_common::Timestamp;
use bsv_hal::{
    ClockError, DigitalOutput, ExternalClock, LocalClock, RequestFrame, StatusDisplay,
    TelemetryLink,
};
use bsv_plant::{BatteryPoll, CounterTotals, PowerPlant};
use chrono::{Datelike, Timelike};
use tokio::time::Instant;
use tracing::{debug, error, info, trace};

use crate::clock_link::ClockLink;
use crate::fault::{Fault, FaultFlag, Phase};
use crate::schedule::{Cadence, Schedule, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Initializing,
    Syncing,
    Running,
    Terminating,
}

impl SupervisorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupervisorState::Initializing => "initializing",
            SupervisorState::Syncing => "syncing",
            SupervisorState::Running => "running",
            SupervisorState::Terminating => "terminating",
        }
    }
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheduling state carried between iterations.
#[derive(Debug, Clone)]
pub struct Bookkeeping {
    /// Day of month of the last clock synchronisation attempt.
    pub last_sync_day: u32,
    pub cadence: Cadence,
    /// Window seen by the previous iteration, `None` before the first one.
    pub last_window: Option<Window>,
    pub iterations: u64,
}

impl Bookkeeping {
    fn starting_at(now: &Timestamp, instant: Instant) -> Self {
        Self {
            last_sync_day: now.day(),
            cadence: Cadence::starting_at(instant),
            last_window: None,
            iterations: 0,
        }
    }

    pub fn last_cycle(&self) -> Instant {
        self.cadence.last_cycle()
    }
}

/// What one `Running` iteration did.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationReport {
    pub timestamp: Timestamp,
    pub window: Window,
    pub window_entered: bool,
    /// Telemetry poll performed this iteration, if the cadence allowed one.
    pub poll: Option<BatteryPoll>,
    pub screen_refreshed: bool,
    pub counters_zeroed: Option<CounterTotals>,
    pub resync: Option<Result<Timestamp, ClockError>>,
}

/// Final report once the supervisor has halted.
#[derive(Debug, Clone, PartialEq)]
pub struct Termination {
    pub fault: Option<Fault>,
    pub iterations: u64,
}

/// Day/night supervisory loop over the power plant, clock link and display.
#[derive(Debug)]
pub struct Supervisor<L, O, E, R, D> {
    plant: PowerPlant<L, O>,
    clock: ClockLink<E, R>,
    display: D,
    schedule: Schedule,
    frame: RequestFrame,
    state: SupervisorState,
    book: Bookkeeping,
    faults: FaultFlag,
}

impl<L, O, E, R, D> Supervisor<L, O, E, R, D>
where
    L: TelemetryLink,
    O: DigitalOutput,
    E: ExternalClock,
    R: LocalClock,
    D: StatusDisplay,
{
    pub fn new(
        plant: PowerPlant<L, O>,
        clock: ClockLink<E, R>,
        display: D,
        schedule: Schedule,
        frame: RequestFrame,
    ) -> Self {
        let book = Bookkeeping::starting_at(&clock.read(), Instant::now());
        Self {
            plant,
            clock,
            display,
            schedule,
            frame,
            state: SupervisorState::Initializing,
            book,
            faults: FaultFlag::new(),
        }
    }

    /// Run until a fault halts the loop.
    pub async fn run(&mut self) -> Termination {
        self.start();
        while self.step().await.is_some() {}
        self.termination()
    }

    /// Record the bookkeeping baseline and synchronise the local clock.
    ///
    /// A failed startup sync terminates before any iteration runs.
    pub fn start(&mut self) -> SupervisorState {
        if self.state != SupervisorState::Initializing {
            return self.state;
        }
        let now = self.clock.read();
        self.book = Bookkeeping::starting_at(&now, Instant::now());
        self.transition(SupervisorState::Syncing);

        match self.clock.sync() {
            Ok(_) => self.transition(SupervisorState::Running),
            Err(err) => {
                self.faults.raise(Fault::new(Phase::StartupSync, err));
                self.terminate();
            }
        }
        self.state
    }

    /// Perform one iteration, or terminate when the fault flag is raised.
    ///
    /// Returns `None` once the supervisor is no longer running.
    pub async fn step(&mut self) -> Option<IterationReport> {
        if self.state != SupervisorState::Running {
            return None;
        }
        if self.faults.is_raised() {
            self.terminate();
            return None;
        }
        Some(self.iterate().await)
    }

    async fn iterate(&mut self) -> IterationReport {
        let timestamp = self.clock.read();
        let hour = timestamp.hour();
        let window = self.schedule.window(hour);
        let window_entered = self.book.last_window != Some(window);
        if window_entered {
            info!(window = %window, hour, "schedule window entered");
        }

        let mut report = IterationReport {
            timestamp,
            window,
            window_entered,
            poll: None,
            screen_refreshed: false,
            counters_zeroed: None,
            resync: None,
        };

        match window {
            Window::Day => self.day_iteration(&mut report).await,
            Window::Night => self.night_iteration(&mut report).await,
        }
        self.book.last_window = Some(window);
        self.book.iterations += 1;

        if !self.faults.is_raised() && self.schedule.resync_due(&timestamp, self.book.last_sync_day)
        {
            let result = self.clock.sync();
            if let Err(err) = &result {
                self.faults.raise(Fault::new(Phase::Resync, err.clone()));
            }
            self.book.last_sync_day = timestamp.day();
            report.resync = Some(result);
        }

        trace!(
            iteration = self.book.iterations,
            window = %window,
            polled = report.poll.is_some(),
            "iteration complete"
        );
        report
    }

    async fn day_iteration(&mut self, report: &mut IterationReport) {
        if !self.claim_cycle(Window::Day) {
            tokio::time::sleep(self.schedule.day_idle).await;
            return;
        }
        let poll = self.plant.read_battery_parameters(&self.frame).await;
        match &poll.fault {
            None => {
                self.plant.set_heaters(&poll.reading);
                self.display.show(&poll.reading);
                report.screen_refreshed = true;
            }
            Some(err) => self.faults.raise(Fault::new(Phase::DayPoll, err.clone())),
        }
        report.poll = Some(poll);
    }

    async fn night_iteration(&mut self, report: &mut IterationReport) {
        self.plant.heaters_all_stop();
        if report.window_entered {
            let totals = self.plant.zero_counters();
            info!(l1 = totals.l1, l2 = totals.l2, "pulse counters zeroed");
            report.counters_zeroed = Some(totals);
        }

        if !self.claim_cycle(Window::Night) {
            tokio::time::sleep(self.schedule.night_idle).await;
            return;
        }
        if self.display.offline_mode_requested() {
            let poll = self.plant.read_battery_parameters(&self.frame).await;
            match &poll.fault {
                None => {
                    self.display.show(&poll.reading);
                    report.screen_refreshed = true;
                }
                Some(err) => self.faults.raise(Fault::new(Phase::NightPoll, err.clone())),
            }
            report.poll = Some(poll);
        } else {
            self.display.show_offline();
            report.screen_refreshed = true;
        }
    }

    fn claim_cycle(&mut self, window: Window) -> bool {
        let now = Instant::now();
        let period = self.schedule.poll_interval(window);
        let since_last = self.book.cadence.since_last(now);
        let claimed = self.book.cadence.try_claim(now, period);
        if claimed {
            debug!(
                window = %window,
                overrun_ms = overrun_ms(since_last, period),
                "cycle started"
            );
        }
        claimed
    }

    /// Fail safe: heaters off, fatal screen, no further iterations.
    pub fn terminate(&mut self) {
        if self.state == SupervisorState::Terminating {
            return;
        }
        self.plant.heaters_all_stop();
        self.display.show_fatal_error();
        self.transition(SupervisorState::Terminating);
        match self.faults.fault() {
            Some(fault) => error!(
                phase = %fault.phase,
                error = %fault.kind,
                iterations = self.book.iterations,
                "supervisor halted"
            ),
            None => error!(iterations = self.book.iterations, "supervisor halted"),
        }
    }

    fn transition(&mut self, next: SupervisorState) {
        info!(from = %self.state, to = %next, "supervisor state transition");
        self.state = next;
    }

    pub fn termination(&self) -> Termination {
        Termination {
            fault: self.faults.fault().cloned(),
            iterations: self.book.iterations,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn bookkeeping(&self) -> &Bookkeeping {
        &self.book
    }

    pub fn faults(&self) -> &FaultFlag {
        &self.faults
    }

    pub fn plant(&self) -> &PowerPlant<L, O> {
        &self.plant
    }

    pub fn clock(&self) -> &ClockLink<E, R> {
        &self.clock
    }

    pub fn display(&self) -> &D {
        &self.display
    }
}
