use crate::math::correlation::{best_lag, peak_of};
use crate::math::{ChirpWaveform, CorrelationPeak, FftHelper, StatsHelper};
use crate::peripheral::{AmplitudeRange, Channel, SampleSource};
use crate::prelude::{ChirpResult, CorrelationMethod, SignalConfig};
use crate::processing::buffer_pool::BufferPool;
use crate::processing::velocity::VelocityEstimate;
use crate::telemetry::log::LogManager;
use ndarray::ArrayView1;

/// Captures an echo window and matches it against a freshly built reference
/// sweep.
pub struct EchoCorrelator {
    config: SignalConfig,
    channel: Channel,
    pool: BufferPool<i64>,
    logger: LogManager,
}

impl EchoCorrelator {
    pub fn new(config: SignalConfig, channel: Channel) -> Self {
        Self {
            config,
            channel,
            pool: BufferPool::with_capacity(2),
            logger: LogManager::new("correlator"),
        }
    }

    /// Sweep sampled at the capture rate policy.
    pub fn waveform(&self, expected_frequency: f64, duration: f64) -> ChirpResult<ChirpWaveform> {
        self.config.waveform(self.config.capture_rate, expected_frequency, duration)
    }

    /// Reference sweep in the source's codes, centered on mid-scale.
    pub fn reference_signal(waveform: &ChirpWaveform, range: AmplitudeRange) -> Vec<i64> {
        waveform
            .quantized(range)
            .map(|code| i64::from(range.center(code)))
            .collect()
    }

    /// Captures `sample_rate × duration` readings and returns the velocity
    /// of the strongest alignment with the reference sweep.
    pub fn estimate_velocity<S>(
        &mut self,
        source: &mut S,
        expected_frequency: f64,
        duration: f64,
    ) -> ChirpResult<VelocityEstimate>
    where
        S: SampleSource + ?Sized,
    {
        let waveform = self.waveform(expected_frequency, duration)?;
        let count = waveform.sample_count();

        let mut reference = self.pool.checkout(count)?;
        let mut captured = match self.pool.checkout(count) {
            Ok(buffer) => buffer,
            Err(err) => {
                self.pool.release(reference);
                return Err(err);
            }
        };
        let outcome = self.analyze(source, &waveform, &mut reference, &mut captured);
        self.pool.release(reference);
        self.pool.release(captured);
        outcome
    }

    /// Best (lag, score) of `reference` against `captured` over the
    /// configured lag set.
    pub fn score(&self, reference: &[i64], captured: &[i64]) -> Option<CorrelationPeak> {
        let max_lag = self
            .config
            .max_lag
            .unwrap_or(usize::MAX)
            .min(captured.len().saturating_sub(1));
        match self.config.correlation {
            CorrelationMethod::Direct => best_lag(
                ArrayView1::from(reference),
                ArrayView1::from(captured),
                max_lag,
            ),
            CorrelationMethod::Spectral => {
                let size = FftHelper::correlation_size(reference.len(), captured.len());
                let mut fft = FftHelper::new(size);
                peak_of(&fft.cross_correlate(reference, captured, max_lag))
            }
        }
    }

    fn analyze<S>(
        &self,
        source: &mut S,
        waveform: &ChirpWaveform,
        reference: &mut [i64],
        captured: &mut [i64],
    ) -> ChirpResult<VelocityEstimate>
    where
        S: SampleSource + ?Sized,
    {
        let range = source.range();
        for (slot, code) in reference.iter_mut().zip(waveform.quantized(range)) {
            *slot = i64::from(range.center(code));
        }
        for slot in captured.iter_mut() {
            let raw = source.read_sample(self.channel)?;
            *slot = i64::from(range.center(raw));
        }

        let peak = self.score(reference, captured);
        let estimate = VelocityEstimate::from_peak(
            peak,
            &waveform.sweep(),
            waveform.sample_rate(),
            captured.len(),
        );
        self.logger.record(&format!(
            "captured {} samples (rms {:.1}, peak {}) -> {:?} velocity {:.3}",
            captured.len(),
            StatsHelper::rms(captured),
            StatsHelper::peak(captured),
            estimate.status,
            estimate.velocity
        ));
        Ok(estimate)
    }
}
