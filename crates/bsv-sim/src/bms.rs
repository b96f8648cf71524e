//! ---
//! ems_section: "11-simulation-test-harness"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Simulated bench collaborators and scenario replay."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::collections::VecDeque;
use std::f64::consts::PI;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bsv_hal::{BatteryReading, RequestFrame, TelemetryError, TelemetryLink};
use rand::prelude::*;
use rand_distr::StandardNormal;
use tracing::{debug, warn};

use crate::replay::ReplayEngine;

const SOC_PERIOD_REQUESTS: f64 = 600.0;
const SOC_NOISE_SIGMA: f64 = 0.4;
const CURRENT_NOISE_SIGMA: f64 = 1.5;

/// Where simulated responses come from.
#[derive(Debug)]
enum ResponseSource {
    Randomized { rng: StdRng },
    Scenario(ReplayEngine),
    Scripted(VecDeque<Result<BatteryReading, TelemetryError>>),
}

/// Shared view on how many requests a [`SimulatedBms`] has served.
#[derive(Debug, Clone, Default)]
pub struct RequestCounter(Arc<AtomicU64>);

impl RequestCounter {
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Battery management unit answering on the simulated serial link.
#[derive(Debug)]
pub struct SimulatedBms {
    source: ResponseSource,
    expected_frame: Option<RequestFrame>,
    fail_after: Option<u64>,
    latency: Duration,
    requests: RequestCounter,
}

impl SimulatedBms {
    /// Slowly charging and discharging battery with seeded noise.
    pub fn randomized(seed: u64) -> Self {
        Self::with_source(ResponseSource::Randomized {
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn from_scenarios<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let replay = ReplayEngine::from_paths(paths).context("unable to load BMS scenarios")?;
        Ok(Self::with_source(ResponseSource::Scenario(replay)))
    }

    pub fn from_replay(replay: ReplayEngine) -> Self {
        Self::with_source(ResponseSource::Scenario(replay))
    }

    /// Answer with `responses` in order; once exhausted the unit stops answering.
    pub fn scripted<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Result<BatteryReading, TelemetryError>>,
    {
        Self::with_source(ResponseSource::Scripted(responses.into_iter().collect()))
    }

    fn with_source(source: ResponseSource) -> Self {
        Self {
            source,
            expected_frame: None,
            fail_after: None,
            latency: Duration::ZERO,
            requests: RequestCounter::default(),
        }
    }

    /// Fail every request after the first `requests` with a transport error.
    pub fn fail_after(mut self, requests: Option<u64>) -> Self {
        self.fail_after = requests;
        self
    }

    /// Reject request frames other than `frame` as malformed.
    pub fn expect_frame(mut self, frame: RequestFrame) -> Self {
        self.expected_frame = Some(frame);
        self
    }

    /// Delay every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn requests(&self) -> RequestCounter {
        self.requests.clone()
    }

    fn next_response(&mut self, request: u64) -> Result<BatteryReading, TelemetryError> {
        match &mut self.source {
            ResponseSource::Randomized { rng } => Ok(drift(rng, request)),
            ResponseSource::Scenario(replay) => match replay.next_frame() {
                Some(frame) => frame.response(),
                None => Err(TelemetryError::Timeout),
            },
            ResponseSource::Scripted(script) => script.pop_front().unwrap_or(Err(TelemetryError::Timeout)),
        }
    }
}

/// Sinusoidal state of charge with the current following its slope.
fn drift(rng: &mut StdRng, request: u64) -> BatteryReading {
    let phase = 2.0 * PI * request as f64 / SOC_PERIOD_REQUESTS;
    let soc_noise: f64 = rng.sample(StandardNormal);
    let current_noise: f64 = rng.sample(StandardNormal);
    let soc = (60.0 + 35.0 * phase.sin() + soc_noise * SOC_NOISE_SIGMA).clamp(0.0, 100.0);
    let current = 25.0 * phase.cos() + current_noise * CURRENT_NOISE_SIGMA;
    let voltage = 46.0 + soc * 0.06;
    BatteryReading::new(soc, current, voltage)
}

#[async_trait]
impl TelemetryLink for SimulatedBms {
    async fn request(&mut self, frame: &RequestFrame) -> Result<BatteryReading, TelemetryError> {
        let request = self.requests.bump();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(expected) = &self.expected_frame {
            if expected != frame {
                return Err(TelemetryError::Malformed(format!(
                    "unexpected request frame {frame}"
                )));
            }
        }
        if self.fail_after.is_some_and(|limit| request > limit) {
            warn!(request, "simulated BMS link failure");
            return Err(TelemetryError::Transport(
                "simulated link failure".to_owned(),
            ));
        }
        let response = self.next_response(request);
        debug!(request, ok = response.is_ok(), "simulated BMS response");
        response
    }
}
