//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the supervisor runtime."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::io::Write;
use std::time::Duration;

use bsv_common::config::AppConfig;
use bsv_common::LogFormat;
use tempfile::NamedTempFile;

#[test]
fn loads_first_existing_candidate() {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
[schedule]
day_start_hour = 7
day_end_hour = 19
day_poll_interval_ms = 2500

[heaters.tank]
pin = 14
activate_soc = 80
deactivate_soc = 90
min_current = -35
max_current = 18

[logging]
format = "pretty"

[simulation]
start_time = "2024-03-01T21:30:00"
time_scale = 30.0
"#
    )
    .unwrap();
    file.flush().unwrap();

    let missing = std::path::PathBuf::from("does/not/exist.toml");
    let loaded = AppConfig::load_with_source(&[missing, file.path().to_path_buf()])
        .expect("config should load");
    assert_eq!(loaded.source, file.path());
    let config = loaded.config;
    assert_eq!(config.schedule.day_start_hour, 7);
    assert_eq!(config.schedule.day_poll_interval, Duration::from_millis(2500));
    assert_eq!(config.schedule.night_idle, Duration::from_millis(200));
    assert_eq!(config.heaters.tank.activate_soc, 80.0);
    assert_eq!(config.heaters.heater.pin, 7);
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert_eq!(
        config.simulation.start_time.map(|ts| ts.to_string()),
        Some("2024-03-01 21:30:00".to_owned())
    );
}

#[test]
fn reports_inspected_candidates_when_none_exist() {
    let err = AppConfig::load(&["nowhere/a.toml", "nowhere/b.toml"]).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("nowhere/a.toml"));
    assert!(message.contains("nowhere/b.toml"));
}

#[test]
fn invalid_file_names_the_path() {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "[simulation]\ntime_scale = 0.0").unwrap();
    file.flush().unwrap();
    let err = AppConfig::load(&[file.path()]).unwrap_err();
    assert!(format!("{err:#}").contains("time_scale"));
}
