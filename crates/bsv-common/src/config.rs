//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the supervisor runtime."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use tracing::debug;

use crate::logging::LogFormat;

/// Query frame for the analog values of battery pack 0 (`~20004642E00200FD37\r`).
pub const DEFAULT_REQUEST_FRAME: &str = "7E3230303034363432453030323030464433370D";

fn default_request_frame() -> String {
    DEFAULT_REQUEST_FRAME.to_owned()
}

fn default_baud_rate() -> u32 {
    19_200
}

fn default_telemetry_timeout() -> Duration {
    Duration::from_secs(1)
}

fn default_day_poll_interval() -> Duration {
    Duration::from_secs(2)
}

fn default_night_poll_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_day_idle() -> Duration {
    Duration::from_millis(100)
}

fn default_night_idle() -> Duration {
    Duration::from_millis(200)
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

fn default_simulation_seed() -> u64 {
    0xB5Du64
}

fn default_time_scale() -> f64 {
    1.0
}

fn default_pulse_interval() -> Duration {
    Duration::from_millis(750)
}

/// Primary configuration object for the supervisor runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub heaters: HeatersConfig,
    #[serde(default)]
    pub counters: CountersConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: PathBuf,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "BSV_CONFIG";

    /// Load configuration from disk, respecting the `BSV_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        contents
            .parse::<AppConfig>()
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.telemetry.validate()?;
        self.heaters.heater.validate("heater")?;
        self.heaters.tank.validate("tank")?;
        self.schedule.validate()?;
        self.simulation.validate()?;
        Ok(())
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Serial link towards the battery management unit.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Request frame as a hex string, sent verbatim on every poll.
    #[serde(default = "default_request_frame")]
    pub request_frame: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_telemetry_timeout", rename = "timeout_ms")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub timeout: Duration,
    #[serde(default)]
    pub tx_pin: u8,
    #[serde(default = "TelemetryConfig::default_rx_pin")]
    pub rx_pin: u8,
}

impl TelemetryConfig {
    const fn default_rx_pin() -> u8 {
        1
    }

    /// Decode the configured request frame into raw bytes.
    pub fn request_bytes(&self) -> Result<Vec<u8>> {
        let bytes = hex::decode(self.request_frame.trim())
            .with_context(|| format!("request_frame '{}' is not valid hex", self.request_frame))?;
        if bytes.is_empty() {
            bail!("request_frame must not be empty");
        }
        Ok(bytes)
    }

    pub fn validate(&self) -> Result<()> {
        self.request_bytes()?;
        if self.baud_rate == 0 {
            bail!("telemetry baud_rate must be positive");
        }
        if self.timeout.is_zero() {
            bail!("telemetry timeout_ms must be positive");
        }
        Ok(())
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            request_frame: default_request_frame(),
            baud_rate: default_baud_rate(),
            timeout: default_telemetry_timeout(),
            tx_pin: 0,
            rx_pin: Self::default_rx_pin(),
        }
    }
}

/// The two heater outputs driven by the plant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatersConfig {
    #[serde(default = "HeaterConfig::heater")]
    pub heater: HeaterConfig,
    #[serde(default = "HeaterConfig::tank")]
    pub tank: HeaterConfig,
}

impl Default for HeatersConfig {
    fn default() -> Self {
        Self {
            heater: HeaterConfig::heater(),
            tank: HeaterConfig::tank(),
        }
    }
}

/// Output pin and switching thresholds of a single heater.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeaterConfig {
    pub pin: u8,
    /// Switch on at or below this state of charge.
    pub activate_soc: f64,
    /// Switch off at or above this state of charge (together with `max_current`).
    pub deactivate_soc: f64,
    /// Switch on at or below this current.
    pub min_current: f64,
    /// Switch off at or above this current (together with `deactivate_soc`).
    pub max_current: f64,
}

impl HeaterConfig {
    pub fn heater() -> Self {
        Self {
            pin: 7,
            activate_soc: 70.0,
            deactivate_soc: 82.0,
            min_current: -40.0,
            max_current: 14.0,
        }
    }

    pub fn tank() -> Self {
        Self {
            pin: 14,
            activate_soc: 86.0,
            deactivate_soc: 92.0,
            min_current: -40.0,
            max_current: 20.0,
        }
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        for (field, value) in [
            ("activate_soc", self.activate_soc),
            ("deactivate_soc", self.deactivate_soc),
        ] {
            if !(0.0..=100.0).contains(&value) {
                bail!("heater '{name}': {field} {value} outside 0..=100");
            }
        }
        if !self.min_current.is_finite() || !self.max_current.is_finite() {
            bail!("heater '{name}': current thresholds must be finite");
        }
        Ok(())
    }
}

/// Pulse counter inputs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CountersConfig {
    #[serde(default = "CountersConfig::default_l1_pin")]
    pub l1_pin: u8,
    #[serde(default = "CountersConfig::default_l2_pin")]
    pub l2_pin: u8,
}

impl CountersConfig {
    const fn default_l1_pin() -> u8 {
        26
    }

    const fn default_l2_pin() -> u8 {
        27
    }
}

impl Default for CountersConfig {
    fn default() -> Self {
        Self {
            l1_pin: Self::default_l1_pin(),
            l2_pin: Self::default_l2_pin(),
        }
    }
}

/// Day/night window and loop cadences.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// First hour (inclusive) of the day window.
    #[serde(default = "ScheduleConfig::default_day_start")]
    pub day_start_hour: u32,
    /// Last hour (inclusive) of the day window.
    #[serde(default = "ScheduleConfig::default_day_end")]
    pub day_end_hour: u32,
    /// Daily clock resync happens once the hour is strictly past this value.
    #[serde(default = "ScheduleConfig::default_resync_after")]
    pub resync_after_hour: u32,
    #[serde(default = "default_day_poll_interval", rename = "day_poll_interval_ms")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub day_poll_interval: Duration,
    #[serde(default = "default_night_poll_interval", rename = "night_poll_interval_ms")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub night_poll_interval: Duration,
    #[serde(default = "default_day_idle", rename = "day_idle_ms")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub day_idle: Duration,
    #[serde(default = "default_night_idle", rename = "night_idle_ms")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub night_idle: Duration,
}

impl ScheduleConfig {
    const fn default_day_start() -> u32 {
        8
    }

    const fn default_day_end() -> u32 {
        18
    }

    const fn default_resync_after() -> u32 {
        19
    }

    pub fn validate(&self) -> Result<()> {
        for (field, hour) in [
            ("day_start_hour", self.day_start_hour),
            ("day_end_hour", self.day_end_hour),
            ("resync_after_hour", self.resync_after_hour),
        ] {
            if hour > 23 {
                bail!("schedule {field} {hour} outside 0..=23");
            }
        }
        if self.day_start_hour > self.day_end_hour {
            bail!(
                "schedule day_start_hour {} is after day_end_hour {}",
                self.day_start_hour,
                self.day_end_hour
            );
        }
        for (field, value) in [
            ("day_poll_interval_ms", self.day_poll_interval),
            ("night_poll_interval_ms", self.night_poll_interval),
            ("day_idle_ms", self.day_idle),
            ("night_idle_ms", self.night_idle),
        ] {
            if value.is_zero() {
                bail!("schedule {field} must be positive");
            }
        }
        Ok(())
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            day_start_hour: Self::default_day_start(),
            day_end_hour: Self::default_day_end(),
            resync_after_hour: Self::default_resync_after(),
            day_poll_interval: default_day_poll_interval(),
            night_poll_interval: default_night_poll_interval(),
            day_idle: default_day_idle(),
            night_idle: default_night_idle(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

/// Settings for the simulated bench used when no hardware is attached.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_simulation_seed")]
    pub seed: u64,
    /// JSON or CSV files replayed as BMS responses; randomized readings when empty.
    #[serde(default)]
    pub scenario_files: Vec<PathBuf>,
    /// Wall-clock time the simulated clocks start at; the host clock when unset.
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
    /// Speed-up factor of simulated wall-clock time.
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
    #[serde(default = "default_pulse_interval", rename = "pulse_interval_ms")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub pulse_interval: Duration,
    /// Make the BMS stop answering after this many requests.
    #[serde(default)]
    pub fail_telemetry_after: Option<u64>,
    /// Make the external reference clock unreadable.
    #[serde(default)]
    pub fail_clock: bool,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            bail!("simulation time_scale must be positive");
        }
        if self.pulse_interval.is_zero() {
            bail!("simulation pulse_interval_ms must be positive");
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: default_simulation_seed(),
            scenario_files: Vec::new(),
            start_time: None,
            time_scale: default_time_scale(),
            pulse_interval: default_pulse_interval(),
            fail_telemetry_after: None,
            fail_clock: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_installation_defaults() {
        let config: AppConfig = "".parse().unwrap();
        assert_eq!(config.heaters.heater, HeaterConfig::heater());
        assert_eq!(config.heaters.tank.max_current, 20.0);
        assert_eq!(config.schedule.day_start_hour, 8);
        assert_eq!(config.schedule.day_end_hour, 18);
        assert_eq!(config.schedule.day_poll_interval, Duration::from_secs(2));
        assert_eq!(config.telemetry.baud_rate, 19_200);
        assert_eq!(
            config.telemetry.request_bytes().unwrap(),
            b"~20004642E00200FD37\r".to_vec()
        );
    }

    #[test]
    fn rejects_inverted_day_window() {
        let err = "[schedule]\nday_start_hour = 19\nday_end_hour = 7\n"
            .parse::<AppConfig>()
            .unwrap_err();
        assert!(err.to_string().contains("day_start_hour"));
    }

    #[test]
    fn rejects_bad_request_frame() {
        assert!("[telemetry]\nrequest_frame = \"7E3Z\"\n"
            .parse::<AppConfig>()
            .is_err());
        assert!("[telemetry]\nrequest_frame = \"\"\n"
            .parse::<AppConfig>()
            .is_err());
    }

    #[test]
    fn asymmetric_hysteresis_is_accepted() {
        let config: AppConfig = r#"
            [heaters.heater]
            pin = 6
            activate_soc = 65
            deactivate_soc = 50
            min_current = -40
            max_current = 14
        "#
        .parse()
        .unwrap();
        assert_eq!(config.heaters.heater.activate_soc, 65.0);
    }

    #[test]
    fn rejects_soc_threshold_out_of_range() {
        let err = r#"
            [heaters.tank]
            pin = 14
            activate_soc = 86
            deactivate_soc = 120
            min_current = -40
            max_current = 20
        "#
        .parse::<AppConfig>()
        .unwrap_err();
        assert!(format!("{err:#}").contains("deactivate_soc"));
    }
}
