use crate::math::ChirpWaveform;
use crate::peripheral::{AmplitudeRange, Attenuation, Channel, Pacer, SampleSink, SampleSource};
use crate::prelude::{ChirpError, ChirpResult, SignalConfig};
use crate::processing::correlator::EchoCorrelator;
use crate::processing::synthesizer::{ChirpSynthesizer, EmissionReport};
use crate::processing::velocity::{PeakStatus, VelocityEstimate};
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::MetricsRecorder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Channel wiring and converter setup applied once at start-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSetup {
    pub output_channel: Channel,
    pub input_channel: Channel,
    pub input_range: AmplitudeRange,
    pub attenuation: Attenuation,
}

impl Default for DeviceSetup {
    fn default() -> Self {
        Self {
            output_channel: Channel(1),
            input_channel: Channel(6),
            input_range: AmplitudeRange::TWELVE_BIT,
            attenuation: Attenuation::Db0,
        }
    }
}

/// The sink, source and real-time wait driven by a cycle.
pub struct Peripherals<K, S, P> {
    pub sink: K,
    pub source: S,
    pub pacer: P,
}

impl<K: SampleSink, S: SampleSource, P: Pacer> Peripherals<K, S, P> {
    pub fn new(sink: K, source: S, pacer: P) -> Self {
        Self { sink, source, pacer }
    }

    pub fn initialize(&mut self, setup: &DeviceSetup) -> ChirpResult<()> {
        self.sink.enable(setup.output_channel)?;
        self.source.configure(setup.input_range, setup.attenuation)?;
        Ok(())
    }
}

/// Outcome of one emit-then-analyze cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReading {
    pub end_frequency: f64,
    pub emission: EmissionReport,
    pub estimate: VelocityEstimate,
}

impl CycleReading {
    pub fn to_json_line(&self) -> ChirpResult<String> {
        serde_json::to_string(self).map_err(|err| ChirpError::Internal(err.to_string()))
    }
}

/// Runs the synthesizer to completion, then the correlator.
pub struct MeasurementCycle {
    synthesizer: ChirpSynthesizer,
    correlator: EchoCorrelator,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl MeasurementCycle {
    pub fn new(config: SignalConfig, setup: &DeviceSetup) -> Self {
        Self {
            synthesizer: ChirpSynthesizer::new(config.clone(), setup.output_channel),
            correlator: EchoCorrelator::new(config, setup.input_channel),
            metrics: Arc::new(MetricsRecorder::new()),
            logger: LogManager::new("cycle"),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<MetricsRecorder> {
        &self.metrics
    }

    /// Sweep the correlator will expect for this cycle.
    pub fn capture_waveform(
        &self,
        end_frequency: f64,
        duration: f64,
    ) -> ChirpResult<ChirpWaveform> {
        self.correlator.waveform(end_frequency, duration)
    }

    pub fn measure<K, S, P>(
        &mut self,
        peripherals: &mut Peripherals<K, S, P>,
        end_frequency: f64,
        duration: f64,
    ) -> ChirpResult<CycleReading>
    where
        K: SampleSink,
        S: SampleSource,
        P: Pacer,
    {
        let outcome = self.run(peripherals, end_frequency, duration);
        match &outcome {
            Ok(reading) => {
                self.metrics.record_cycle();
                match reading.estimate.status {
                    PeakStatus::Resolved => {}
                    PeakStatus::ZeroLag => self.metrics.record_zero_lag(),
                    PeakStatus::NoPositivePeak => self.metrics.record_missing_peak(),
                }
            }
            Err(ChirpError::InvalidSweep(_)) | Err(ChirpError::InvalidSampleRate(_)) => {
                self.metrics.record_rejected()
            }
            Err(err) => {
                self.metrics.record_fault();
                self.logger
                    .warn(&format!("cycle at {end_frequency:.0} Hz failed: {err}"));
            }
        }
        outcome
    }

    fn run<K, S, P>(
        &mut self,
        peripherals: &mut Peripherals<K, S, P>,
        end_frequency: f64,
        duration: f64,
    ) -> ChirpResult<CycleReading>
    where
        K: SampleSink,
        S: SampleSource,
        P: Pacer,
    {
        // Validate both sides before the sink is driven.
        self.synthesizer.waveform(end_frequency, duration)?;
        self.correlator.waveform(end_frequency, duration)?;

        let emission = self.synthesizer.emit_chirp(
            &mut peripherals.sink,
            &mut peripherals.pacer,
            end_frequency,
            duration,
        )?;
        let estimate =
            self.correlator
                .estimate_velocity(&mut peripherals.source, end_frequency, duration)?;
        self.logger.record(&format!(
            "{:.0} Hz: {} samples out, {} in, velocity {:.3} ({:?})",
            end_frequency,
            emission.samples_written,
            estimate.sample_count,
            estimate.velocity,
            estimate.status
        ));
        Ok(CycleReading {
            end_frequency,
            emission,
            estimate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peripheral::{FreeRunningPacer, RecordingSink, ReplaySource};

    fn peripherals() -> Peripherals<RecordingSink, ReplaySource, FreeRunningPacer> {
        let mut peripherals = Peripherals::new(
            RecordingSink::new(AmplitudeRange::EIGHT_BIT),
            ReplaySource::new(AmplitudeRange::TWELVE_BIT),
            FreeRunningPacer::new(),
        );
        peripherals.initialize(&DeviceSetup::default()).unwrap();
        peripherals
    }

    #[test]
    fn loopback_cycle_reads_zero_velocity() {
        let mut cycle = MeasurementCycle::new(SignalConfig::default(), &DeviceSetup::default());
        let mut peripherals = peripherals();
        let waveform = cycle.capture_waveform(80e3, 0.01).unwrap();
        peripherals
            .source
            .load(waveform.quantized(AmplitudeRange::TWELVE_BIT));

        let reading = cycle.measure(&mut peripherals, 80e3, 0.01).unwrap();

        assert_eq!(reading.emission.samples_written, 1600);
        assert_eq!(reading.estimate.sample_count, 1600);
        assert!(reading.estimate.velocity.abs() < 0.5);
        let snapshot = cycle.metrics().snapshot();
        assert_eq!(snapshot.cycles, 1);
        assert_eq!(snapshot.zero_lag_peaks, 1);
        assert!(reading.to_json_line().unwrap().contains("\"zero_lag\""));
    }

    #[test]
    fn legacy_profile_keeps_the_rate_asymmetry() {
        let mut cycle = MeasurementCycle::new(SignalConfig::legacy(), &DeviceSetup::default());
        let mut peripherals = peripherals();

        let low = cycle.measure(&mut peripherals, 80e3, 0.01).unwrap();
        let high = cycle.measure(&mut peripherals, 160e3, 0.01).unwrap();

        assert_eq!(high.emission.samples_written, 2 * low.emission.samples_written);
        assert_eq!(high.estimate.sample_count, low.estimate.sample_count);
        assert_eq!(cycle.metrics().snapshot().missing_peaks, 2);
    }

    #[test]
    fn rejected_sweep_is_counted_and_emits_nothing() {
        let mut cycle = MeasurementCycle::new(SignalConfig::default(), &DeviceSetup::default());
        let mut peripherals = peripherals();

        assert!(cycle.measure(&mut peripherals, 80e3, -0.01).is_err());
        assert!(peripherals.sink.samples().is_empty());
        assert_eq!(cycle.metrics().snapshot().rejected, 1);
    }

    #[test]
    fn oversized_sweep_is_rejected_before_the_sink() {
        let mut cycle = MeasurementCycle::new(SignalConfig::default(), &DeviceSetup::default());
        let mut peripherals = peripherals();

        let err = cycle.measure(&mut peripherals, 1e9, 1.0).unwrap_err();

        assert!(matches!(err, ChirpError::InvalidSweep(_)));
        assert!(peripherals.sink.samples().is_empty());
        assert_eq!(peripherals.source.reads(), 0);
        assert_eq!(cycle.metrics().snapshot().rejected, 1);
    }
}
