//! ---
//! ems_section: "08-energy-models-optimization"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Heater control and power plant composition."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::time::Duration;

use bsv_hal::{BatteryReading, PulseCounter, RequestFrame, TelemetryError};
use bsv_plant::{CounterTotals, HeaterController, HeaterState, HeaterThresholds, PowerPlant};
use bsv_sim::{SimOutput, SimulatedBms};

struct Bench {
    plant: PowerPlant<SimulatedBms, SimOutput>,
    heater_pin: SimOutput,
    tank_pin: SimOutput,
    l1: PulseCounter,
    l2: PulseCounter,
}

fn bench(bms: SimulatedBms) -> Bench {
    let heater_pin = SimOutput::new(7);
    let tank_pin = SimOutput::new(14);
    let l1 = PulseCounter::new(26);
    let l2 = PulseCounter::new(27);
    let plant = PowerPlant::new(
        bms,
        HeaterController::new(
            "heater",
            HeaterThresholds::new(50.0, 65.0, -40.0, 14.0),
            heater_pin.clone(),
        ),
        HeaterController::new(
            "tank",
            HeaterThresholds::new(30.0, 40.0, -40.0, 20.0),
            tank_pin.clone(),
        ),
        l1.clone(),
        l2.clone(),
    )
    .with_request_timeout(Duration::from_secs(1));
    Bench {
        plant,
        heater_pin,
        tank_pin,
        l1,
        l2,
    }
}

fn frame() -> RequestFrame {
    RequestFrame::from_hex("7E3230303034363432453030323030464433370D").unwrap()
}

#[tokio::test(start_paused = true)]
async fn reading_drives_both_heaters_independently() {
    let reading = BatteryReading::new(45.0, -10.0, 48.2);
    let mut bench = bench(SimulatedBms::scripted([Ok(reading)]));

    let poll = bench.plant.read_battery_parameters(&frame()).await;
    assert!(!poll.is_fault());
    assert_eq!(poll.reading, reading);

    bench.plant.set_heaters(&poll.reading);
    assert!(bench.heater_pin.is_high());
    // SOC 45 sits inside the tank's band and the tank was off.
    assert!(!bench.tank_pin.is_high());
    assert_eq!(
        bench.plant.heater_states(),
        (HeaterState::On, HeaterState::Off)
    );
}

#[tokio::test(start_paused = true)]
async fn slow_unit_times_out_with_zero_reading() {
    let mut bench = bench(
        SimulatedBms::scripted([Ok(BatteryReading::new(80.0, 5.0, 51.0))])
            .with_latency(Duration::from_secs(3)),
    );
    let poll = bench.plant.read_battery_parameters(&frame()).await;
    assert_eq!(poll.fault, Some(TelemetryError::Timeout));
    assert_eq!(poll.reading, BatteryReading::default());
}

#[tokio::test(start_paused = true)]
async fn out_of_range_soc_is_a_malformed_response() {
    let mut bench = bench(SimulatedBms::scripted([Ok(BatteryReading::new(
        180.0, 0.0, 48.0,
    ))]));
    let poll = bench.plant.read_battery_parameters(&frame()).await;
    assert!(matches!(
        poll.clone().into_result(),
        Err(TelemetryError::Malformed(_))
    ));
    assert_eq!(poll.reading.soc, 0.0);
}

#[tokio::test(start_paused = true)]
async fn transport_failure_is_reported() {
    let mut bench = bench(SimulatedBms::randomized(3).fail_after(Some(0)));
    let poll = bench.plant.read_battery_parameters(&frame()).await;
    assert!(matches!(poll.fault, Some(TelemetryError::Transport(_))));
}

#[test]
fn zero_counters_drains_both_inputs() {
    let bench = bench(SimulatedBms::scripted([]));
    for _ in 0..3 {
        bench.l1.increment();
    }
    bench.l2.increment();

    assert_eq!(bench.plant.zero_counters(), CounterTotals { l1: 3, l2: 1 });
    assert_eq!(bench.l1.count(), 0);
    assert_eq!(bench.l2.count(), 0);
    assert_eq!(bench.plant.zero_counters(), CounterTotals::default());
}

#[test]
fn all_stop_forces_both_outputs_low() {
    let mut bench = bench(SimulatedBms::scripted([]));
    bench
        .plant
        .set_heaters(&BatteryReading::new(10.0, -60.0, 47.0));
    assert!(bench.heater_pin.is_high());
    assert!(bench.tank_pin.is_high());

    bench.plant.heaters_all_stop();
    assert!(!bench.heater_pin.is_high());
    assert!(!bench.tank_pin.is_high());
    assert_eq!(bench.plant.heater().state(), HeaterState::Off);
    assert_eq!(bench.plant.tank().state(), HeaterState::Off);
}
