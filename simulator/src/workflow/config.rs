use crate::generator::echo::EchoConfig;
use anyhow::{ensure, Context};
use chirpcore::peripheral::AmplitudeRange;
use chirpcore::processing::DeviceSetup;
use chirpcore::SignalConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// End frequencies swept in turn, one cycle each.
    pub frequencies: Vec<f64>,
    pub duration: f64,
    /// Pause after every cycle.
    pub pause_ms: u64,
    pub rounds: usize,
    /// Pace emission in real time instead of free-running.
    pub realtime: bool,
    pub output_range: AmplitudeRange,
    pub signal: SignalConfig,
    pub device: DeviceSetup,
    pub echo: EchoConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            frequencies: vec![80_000.0, 200_000.0],
            duration: 0.01,
            pause_ms: 1000,
            rounds: 1,
            realtime: false,
            output_range: AmplitudeRange::EIGHT_BIT,
            signal: SignalConfig::default(),
            device: DeviceSetup::default(),
            echo: EchoConfig::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        frequencies: Vec<f64>,
        duration: f64,
        rounds: usize,
        pause_ms: u64,
        legacy_rates: bool,
    ) -> Self {
        let signal = if legacy_rates {
            SignalConfig::legacy()
        } else {
            SignalConfig::default()
        };
        Self {
            frequencies,
            duration,
            rounds,
            pause_ms,
            signal,
            ..Default::default()
        }
    }

    /// Rejects configurations whose sweeps could never be emitted.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.frequencies.is_empty(), "no sweep frequencies configured");
        for &frequency in &self.frequencies {
            self.signal
                .sweep(frequency, self.duration)
                .with_context(|| format!("sweep to {frequency} Hz over {}s", self.duration))?;
        }
        Ok(())
    }
}
