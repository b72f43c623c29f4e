//! Linear frequency sweep shared by the emitter and the reference builder.

use crate::peripheral::AmplitudeRange;
use crate::prelude::{PhaseModel, SweepParameters};
use std::f64::consts::PI;
use std::time::Duration;

/// A sweep sampled at a fixed rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChirpWaveform {
    sweep: SweepParameters,
    sample_rate: f64,
    phase_model: PhaseModel,
}

impl ChirpWaveform {
    pub fn new(sweep: SweepParameters, sample_rate: f64, phase_model: PhaseModel) -> Self {
        Self {
            sweep,
            sample_rate,
            phase_model,
        }
    }

    pub fn sweep(&self) -> SweepParameters {
        self.sweep
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// `round(sample_rate × duration)`.
    pub fn sample_count(&self) -> usize {
        (self.sample_rate * self.sweep.duration()).round() as usize
    }

    pub fn interval_secs(&self) -> f64 {
        1.0 / self.sample_rate
    }

    pub fn time_at(&self, index: usize) -> f64 {
        index as f64 * self.interval_secs()
    }

    /// Offset of sample `index` from the start of the sweep.
    pub fn offset(&self, index: usize) -> Duration {
        Duration::from_secs_f64(self.time_at(index))
    }

    pub fn instantaneous_frequency(&self, t: f64) -> f64 {
        self.sweep.start_frequency() + self.sweep.span() * t / self.sweep.duration()
    }

    pub fn phase(&self, t: f64) -> f64 {
        match self.phase_model {
            PhaseModel::Direct => 2.0 * PI * self.instantaneous_frequency(t) * t,
            PhaseModel::Integrated => {
                let chirp_rate = self.sweep.span() / self.sweep.duration();
                2.0 * PI * (self.sweep.start_frequency() * t + 0.5 * chirp_rate * t * t)
            }
        }
    }

    /// Sinusoid value in `[-1, 1]` at sample `index`.
    pub fn unit_sample(&self, index: usize) -> f64 {
        self.phase(self.time_at(index)).sin()
    }

    /// Lazy stream of converter codes for every sample of the sweep.
    pub fn quantized(&self, range: AmplitudeRange) -> impl Iterator<Item = u16> {
        let waveform = *self;
        (0..waveform.sample_count()).map(move |index| range.quantize(waveform.unit_sample(index)))
    }
}
