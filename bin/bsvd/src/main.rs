//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Binary entrypoint for the supervisor daemon."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
mod bench;

use std::path::PathBuf;

use anyhow::Result;
use bsv_common::config::AppConfig;
use bsv_common::logging::init_tracing;
use bsv_common::Timestamp;
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{error, info, warn};

use crate::bench::Bench;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Battery heater supervisor daemon",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(
        long,
        value_name = "YYYY-MM-DDTHH:MM:SS",
        help = "Wall-clock time the simulated clocks start at"
    )]
    start_time: Option<Timestamp>,

    #[arg(long, help = "Speed-up factor of simulated wall-clock time")]
    time_scale: Option<f64>,

    #[arg(long, help = "Start with the offline telemetry screen requested")]
    offline_telemetry: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Run the supervisor on the simulated bench")]
    Run,
    #[command(about = "Load and validate the configuration, then exit")]
    CheckConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from("configs/bsvd.toml"));
    candidates.push(PathBuf::from("configs/example.toml"));

    let loaded = AppConfig::load_with_source(&candidates)?;
    let mut config = loaded.config;
    if let Some(start_time) = cli.start_time {
        config.simulation.start_time = Some(start_time);
    }
    if let Some(time_scale) = cli.time_scale {
        config.simulation.time_scale = time_scale;
    }
    config.validate()?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::CheckConfig => {
            println!(
                "Configuration: {}\nDay window: {:02}:00-{:02}:59\nHeater: on <= {}% or <= {}A, off >= {}% and >= {}A\nTank: on <= {}% or <= {}A, off >= {}% and >= {}A",
                loaded.source.display(),
                config.schedule.day_start_hour,
                config.schedule.day_end_hour,
                config.heaters.heater.activate_soc,
                config.heaters.heater.min_current,
                config.heaters.heater.deactivate_soc,
                config.heaters.heater.max_current,
                config.heaters.tank.activate_soc,
                config.heaters.tank.min_current,
                config.heaters.tank.deactivate_soc,
                config.heaters.tank.max_current,
            );
        }
        Commands::Run => {
            init_tracing("bsvd", &config.logging)?;
            info!(source = %loaded.source.display(), "configuration loaded");
            run_supervisor(&config, cli.offline_telemetry).await?;
        }
    }

    Ok(())
}

async fn run_supervisor(config: &AppConfig, offline_telemetry: bool) -> Result<()> {
    let start = config
        .simulation
        .start_time
        .unwrap_or_else(|| chrono::Local::now().naive_local());
    let mut bench = Bench::build(config, start)?;
    if offline_telemetry {
        bench.mode_button.press();
    }

    let finished = tokio::select! {
        termination = bench.supervisor.run() => Some(termination),
        result = signal::ctrl_c() => {
            result?;
            None
        }
    };

    match finished {
        Some(termination) => {
            match &termination.fault {
                Some(fault) => error!(
                    error = %fault,
                    iterations = termination.iterations,
                    "supervisor terminated; heaters off, waiting for operator"
                ),
                None => warn!(
                    iterations = termination.iterations,
                    "supervisor stopped without fault"
                ),
            }
            signal::ctrl_c().await?;
            info!("ctrl-c received; exiting");
        }
        None => {
            info!("ctrl-c received; stopping heaters");
            bench.supervisor.terminate();
        }
    }
    Ok(())
}
