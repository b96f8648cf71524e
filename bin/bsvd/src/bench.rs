//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Binary entrypoint for the supervisor daemon."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use anyhow::{Context, Result};
use bsv_common::config::AppConfig;
use bsv_common::Timestamp;
use bsv_core::{ClockLink, Schedule, Supervisor};
use bsv_hal::{ModeToggle, PulseCounter, RequestFrame};
use bsv_plant::{HeaterController, HeaterThresholds, PowerPlant};
use bsv_sim::{
    spawn_pulse_source, RecordingDisplay, SimOutput, SimulatedBms, SimulatedExternalClock,
    SimulatedRtc,
};
use tokio::task::JoinHandle;
use tracing::info;

pub type BenchSupervisor =
    Supervisor<SimulatedBms, SimOutput, SimulatedExternalClock, SimulatedRtc, RecordingDisplay>;

/// Supervisor wired to simulated hardware, plus the background pulse sources.
pub struct Bench {
    pub supervisor: BenchSupervisor,
    pub mode_button: ModeToggle,
    pulse_sources: Vec<JoinHandle<()>>,
}

impl Bench {
    /// Wire every collaborator from `config`. Must be called inside a tokio runtime.
    pub fn build(config: &AppConfig, start: Timestamp) -> Result<Self> {
        let sim = &config.simulation;
        let frame = RequestFrame::from_config(&config.telemetry)
            .context("telemetry request_frame is not valid hex")?;

        let bms = if sim.scenario_files.is_empty() {
            SimulatedBms::randomized(sim.seed)
        } else {
            SimulatedBms::from_scenarios(sim.scenario_files.as_slice())?
        }
        .expect_frame(frame.clone())
        .fail_after(sim.fail_telemetry_after);
        info!(
            baud_rate = config.telemetry.baud_rate,
            tx_pin = config.telemetry.tx_pin,
            rx_pin = config.telemetry.rx_pin,
            frame = %frame,
            scenarios = sim.scenario_files.len(),
            "simulated BMS link attached"
        );

        let heaters = &config.heaters;
        let heater = HeaterController::new(
            "heater",
            HeaterThresholds::from(&heaters.heater),
            SimOutput::new(heaters.heater.pin),
        );
        let tank = HeaterController::new(
            "tank",
            HeaterThresholds::from(&heaters.tank),
            SimOutput::new(heaters.tank.pin),
        );

        let l1 = PulseCounter::new(config.counters.l1_pin);
        let l2 = PulseCounter::new(config.counters.l2_pin);
        let pulse_sources = vec![
            spawn_pulse_source(l1.clone(), sim.pulse_interval),
            spawn_pulse_source(l2.clone(), sim.pulse_interval * 2),
        ];

        let plant = PowerPlant::new(bms, heater, tank, l1, l2)
            .with_request_timeout(config.telemetry.timeout);

        let rtc = SimulatedRtc::new(start, sim.time_scale);
        let chip = SimulatedExternalClock::new(start, sim.time_scale);
        chip.set_failing(sim.fail_clock);

        let mode_button = ModeToggle::new();
        let display = RecordingDisplay::new(mode_button.clone()).echoing();

        let supervisor = Supervisor::new(
            plant,
            ClockLink::new(chip, rtc),
            display,
            Schedule::from(&config.schedule),
            frame,
        );
        info!(start = %start, time_scale = sim.time_scale, "simulated bench ready");
        Ok(Self {
            supervisor,
            mode_button,
            pulse_sources,
        })
    }
}

impl Drop for Bench {
    fn drop(&mut self) {
        for source in &self.pulse_sources {
            source.abort();
        }
    }
}
