//! ---
//! ems_section: "11-simulation-test-harness"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Simulated bench collaborators and scenario replay."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use bsv_hal::{BatteryReading, TelemetryError};
use csv::ReaderBuilder;
use serde::Deserialize;

/// One recorded BMS response.
///
/// A non-empty `fault` replays a transport failure instead of a reading.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioFrame {
    pub soc: f64,
    pub current: f64,
    pub voltage: f64,
    #[serde(default)]
    pub fault: Option<String>,
}

impl ScenarioFrame {
    pub fn response(&self) -> Result<BatteryReading, TelemetryError> {
        match self.fault.as_deref().map(str::trim) {
            Some(reason) if !reason.is_empty() => Err(TelemetryError::Transport(reason.to_owned())),
            _ => Ok(BatteryReading::new(self.soc, self.current, self.voltage)),
        }
    }
}

/// Cycles through recorded BMS responses in file order.
#[derive(Debug, Default, Clone)]
pub struct ReplayEngine {
    frames: Vec<ScenarioFrame>,
    cursor: usize,
}

impl ReplayEngine {
    pub fn from_frames(frames: Vec<ScenarioFrame>) -> Self {
        Self { frames, cursor: 0 }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let frames = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => read_json(path)?,
            Some("csv") => read_csv(path)?,
            _ => anyhow::bail!("unsupported scenario format: {}", path.display()),
        };
        Ok(Self::from_frames(frames))
    }

    /// Concatenate several scenario files into one replay.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut frames = Vec::new();
        for path in paths {
            frames.extend(Self::from_path(path.as_ref())?.frames);
        }
        if frames.is_empty() {
            anyhow::bail!("scenario files contain no frames");
        }
        Ok(Self::from_frames(frames))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn next_frame(&mut self) -> Option<ScenarioFrame> {
        if self.frames.is_empty() {
            return None;
        }
        let frame = self.frames[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.frames.len();
        Some(frame)
    }
}

fn read_json(path: &Path) -> Result<Vec<ScenarioFrame>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("unable to read scenario file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("invalid scenario JSON {}", path.display()))
}

fn read_csv(path: &Path) -> Result<Vec<ScenarioFrame>> {
    let file = fs::File::open(path)
        .with_context(|| format!("unable to open scenario csv {}", path.display()))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);
    let mut frames = Vec::new();
    for row in reader.deserialize::<ScenarioFrame>() {
        frames.push(row.with_context(|| format!("invalid scenario row in {}", path.display()))?);
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn loads_json_scenarios() -> Result<()> {
        let mut file = Builder::new().suffix(".json").tempfile()?;
        writeln!(
            file,
            "{}",
            r#"[{"soc":45.0,"current":-10.0,"voltage":48.2},{"soc":0,"current":0,"voltage":0,"fault":"framing error"}]"#
        )?;
        file.flush()?;
        let path = file.into_temp_path();
        let mut replay = ReplayEngine::from_path(path.as_ref())?;
        assert_eq!(replay.len(), 2);
        let frame = replay.next_frame().expect("frame expected");
        assert_eq!(frame.response(), Ok(BatteryReading::new(45.0, -10.0, 48.2)));
        let faulty = replay.next_frame().expect("frame expected");
        assert_eq!(
            faulty.response(),
            Err(TelemetryError::Transport("framing error".to_owned()))
        );
        path.close()?;
        Ok(())
    }

    #[test]
    fn loads_csv_scenarios_with_empty_fault_column() -> Result<()> {
        let mut file = Builder::new().suffix(".csv").tempfile()?;
        writeln!(file, "soc,current,voltage,fault")?;
        writeln!(file, "72.5, 15.0, 52.1,")?;
        file.flush()?;
        let path = file.into_temp_path();
        let mut replay = ReplayEngine::from_path(path.as_ref())?;
        let frame = replay.next_frame().expect("frame expected");
        assert_eq!(frame.soc, 72.5);
        assert!(frame.response().is_ok());
        path.close()?;
        Ok(())
    }

    #[test]
    fn rejects_unknown_extensions() {
        let err = ReplayEngine::from_path(Path::new("scenario.yaml")).unwrap_err();
        assert!(err.to_string().contains("unsupported scenario format"));
    }

    #[test]
    fn next_frame_cycles_through_frames() {
        let frame = |soc| ScenarioFrame {
            soc,
            current: 0.0,
            voltage: 48.0,
            fault: None,
        };
        let mut replay = ReplayEngine::from_frames(vec![frame(10.0), frame(20.0)]);
        let first = replay.next_frame().unwrap();
        let second = replay.next_frame().unwrap();
        let third = replay.next_frame().unwrap();
        assert_ne!(first.soc, second.soc);
        assert_eq!(first, third);
    }
}
