use crate::math::ChirpWaveform;
use crate::peripheral::PeripheralError;
use serde::{Deserialize, Serialize};

/// Start of every sweep emitted by the device.
pub const DEFAULT_START_FREQUENCY_HZ: f64 = 10_000.0;

/// Capture rate of the original firmware, independent of the sweep.
pub const LEGACY_CAPTURE_RATE_HZ: f64 = 400_000.0;

/// Longest sample window a single sweep may emit or capture.
pub const DEFAULT_MAX_SAMPLES: usize = 500_000;

/// Validated sweep description shared by emission and analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepParameters {
    start_frequency: f64,
    end_frequency: f64,
    duration: f64,
}

impl SweepParameters {
    /// Builds a sweep, rejecting non-finite or non-positive values and
    /// down-chirps. `end == start` is accepted as a constant tone.
    pub fn new(start_frequency: f64, end_frequency: f64, duration: f64) -> ChirpResult<Self> {
        if !start_frequency.is_finite() || start_frequency <= 0.0 {
            return Err(ChirpError::InvalidSweep(format!(
                "start frequency must be positive, got {start_frequency}"
            )));
        }
        if !end_frequency.is_finite() || end_frequency < start_frequency {
            return Err(ChirpError::InvalidSweep(format!(
                "end frequency {end_frequency} below start frequency {start_frequency}"
            )));
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ChirpError::InvalidSweep(format!(
                "duration must be positive, got {duration}"
            )));
        }
        Ok(Self {
            start_frequency,
            end_frequency,
            duration,
        })
    }

    pub fn start_frequency(&self) -> f64 {
        self.start_frequency
    }

    pub fn end_frequency(&self) -> f64 {
        self.end_frequency
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Frequency span covered by the sweep.
    pub fn span(&self) -> f64 {
        self.end_frequency - self.start_frequency
    }
}

/// How a component derives its sample rate from the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SampleRatePolicy {
    /// Twice the sweep's end frequency.
    Nyquist,
    /// Constant rate regardless of the sweep.
    Fixed { hz: f64 },
}

impl SampleRatePolicy {
    pub fn resolve(&self, sweep: &SweepParameters) -> ChirpResult<f64> {
        let rate = match *self {
            SampleRatePolicy::Nyquist => 2.0 * sweep.end_frequency(),
            SampleRatePolicy::Fixed { hz } => hz,
        };
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ChirpError::InvalidSampleRate(format!(
                "{self:?} resolved to {rate}"
            )));
        }
        Ok(rate)
    }
}

/// Phase formulation used when evaluating the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhaseModel {
    /// `2π·f(t)·t`, the firmware's approximation.
    #[default]
    Direct,
    /// `2π·∫f(τ)dτ`, the exact linear chirp.
    Integrated,
}

/// Matched-filter engine used by the correlator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMethod {
    /// Per-lag dot products, keeping only the running maximum.
    #[default]
    Direct,
    /// FFT-based linear cross-correlation.
    Spectral,
}

/// Shared configuration for the synthesizer and the correlator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub start_frequency_hz: f64,
    pub emission_rate: SampleRatePolicy,
    pub capture_rate: SampleRatePolicy,
    pub phase_model: PhaseModel,
    pub correlation: CorrelationMethod,
    /// Largest lag scored; `None` scans the whole window.
    pub max_lag: Option<usize>,
    /// Upper bound on `sample_rate × duration` for either side.
    pub max_samples: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            start_frequency_hz: DEFAULT_START_FREQUENCY_HZ,
            emission_rate: SampleRatePolicy::Nyquist,
            capture_rate: SampleRatePolicy::Nyquist,
            phase_model: PhaseModel::Direct,
            correlation: CorrelationMethod::Direct,
            max_lag: None,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

impl SignalConfig {
    /// Frequency-derived emission, fixed 400 kHz capture.
    pub fn legacy() -> Self {
        Self {
            capture_rate: SampleRatePolicy::Fixed {
                hz: LEGACY_CAPTURE_RATE_HZ,
            },
            ..Default::default()
        }
    }

    pub fn sweep(&self, end_frequency: f64, duration: f64) -> ChirpResult<SweepParameters> {
        SweepParameters::new(self.start_frequency_hz, end_frequency, duration)
    }

    /// Sweep sampled under `policy`, refusing windows longer than
    /// `max_samples`.
    pub fn waveform(
        &self,
        policy: SampleRatePolicy,
        end_frequency: f64,
        duration: f64,
    ) -> ChirpResult<ChirpWaveform> {
        let sweep = self.sweep(end_frequency, duration)?;
        let sample_rate = policy.resolve(&sweep)?;
        let samples = (sample_rate * duration).round();
        if samples > self.max_samples as f64 {
            return Err(ChirpError::InvalidSweep(format!(
                "{samples:.0} samples at {sample_rate:.0} Hz exceed the limit of {}",
                self.max_samples
            )));
        }
        Ok(ChirpWaveform::new(sweep, sample_rate, self.phase_model))
    }
}

/// Common error type for emission and analysis.
#[derive(thiserror::Error, Debug)]
pub enum ChirpError {
    #[error("invalid sweep: {0}")]
    InvalidSweep(String),
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(String),
    #[error("peripheral fault: {0}")]
    Peripheral(#[from] PeripheralError),
    #[error("buffer exhaustion: {0}")]
    BufferExhaustion(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type ChirpResult<T> = Result<T, ChirpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_rejects_non_positive_inputs() {
        assert!(SweepParameters::new(0.0, 80e3, 0.01).is_err());
        assert!(SweepParameters::new(10e3, 80e3, 0.0).is_err());
        assert!(SweepParameters::new(10e3, 80e3, -1.0).is_err());
        assert!(SweepParameters::new(10e3, 5e3, 0.01).is_err());
        assert!(SweepParameters::new(10e3, f64::NAN, 0.01).is_err());
    }

    #[test]
    fn sweep_accepts_zero_span_tone() {
        let sweep = SweepParameters::new(10e3, 10e3, 0.01).unwrap();
        assert_eq!(sweep.span(), 0.0);
    }

    #[test]
    fn nyquist_policy_tracks_end_frequency() {
        let sweep = SweepParameters::new(10e3, 80e3, 0.01).unwrap();
        assert_eq!(SampleRatePolicy::Nyquist.resolve(&sweep).unwrap(), 160e3);
        let fixed = SampleRatePolicy::Fixed { hz: 400e3 };
        assert_eq!(fixed.resolve(&sweep).unwrap(), 400e3);
        assert!(SampleRatePolicy::Fixed { hz: 0.0 }.resolve(&sweep).is_err());
    }

    #[test]
    fn oversized_window_is_rejected_as_invalid_sweep() {
        let config = SignalConfig::default();
        let err = config
            .waveform(SampleRatePolicy::Nyquist, 1e18, 1.0)
            .unwrap_err();
        assert!(matches!(err, ChirpError::InvalidSweep(_)));
        assert!(config.waveform(SampleRatePolicy::Nyquist, 1e9, 1.0).is_err());

        let at_limit = SignalConfig {
            max_samples: 1600,
            ..Default::default()
        };
        let waveform = at_limit
            .waveform(SampleRatePolicy::Nyquist, 80e3, 0.01)
            .unwrap();
        assert_eq!(waveform.sample_count(), 1600);
        assert!(at_limit
            .waveform(SampleRatePolicy::Nyquist, 80.5e3, 0.01)
            .is_err());
    }

    #[test]
    fn signal_config_parses_from_json() {
        let json = r#"{"capture_rate":{"kind":"fixed","hz":400000.0},"phase_model":"integrated"}"#;
        let config: SignalConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config,
            SignalConfig {
                phase_model: PhaseModel::Integrated,
                ..SignalConfig::legacy()
            }
        );
    }
}
