use crate::math::ChirpWaveform;
use crate::peripheral::{Channel, Pacer, SampleSink};
use crate::prelude::{ChirpResult, SignalConfig, SweepParameters};
use crate::telemetry::log::LogManager;
use serde::Serialize;

/// Level written after the sweep to leave the output quiesced.
pub const NEUTRAL_LEVEL: u16 = 0;

/// Summary of one emitted sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmissionReport {
    pub sweep: SweepParameters,
    pub sample_rate: f64,
    pub interval_secs: f64,
    pub samples_written: usize,
}

/// Writes a linear up-chirp to the output sink, one sample per interval.
pub struct ChirpSynthesizer {
    config: SignalConfig,
    channel: Channel,
    logger: LogManager,
}

impl ChirpSynthesizer {
    pub fn new(config: SignalConfig, channel: Channel) -> Self {
        Self {
            config,
            channel,
            logger: LogManager::new("synthesizer"),
        }
    }

    /// Sweep sampled at the emission rate policy.
    pub fn waveform(&self, end_frequency: f64, duration: f64) -> ChirpResult<ChirpWaveform> {
        self.config.waveform(self.config.emission_rate, end_frequency, duration)
    }

    /// Emits the sweep, blocking on `pacer` so that sample `i` leaves at
    /// `i × interval`, then writes [`NEUTRAL_LEVEL`].
    pub fn emit_chirp<S, P>(
        &self,
        sink: &mut S,
        pacer: &mut P,
        end_frequency: f64,
        duration: f64,
    ) -> ChirpResult<EmissionReport>
    where
        S: SampleSink + ?Sized,
        P: Pacer + ?Sized,
    {
        let waveform = self.waveform(end_frequency, duration)?;
        let mut written = 0;
        pacer.begin();
        for (index, value) in waveform.quantized(sink.range()).enumerate() {
            pacer.wait_until(waveform.offset(index));
            sink.write_sample(self.channel, value)?;
            written += 1;
        }
        pacer.wait_until(waveform.offset(written));
        sink.write_sample(self.channel, NEUTRAL_LEVEL)?;
        Ok(self.report(&waveform, written))
    }

    /// Cooperative variant of [`emit_chirp`](Self::emit_chirp): every sample
    /// awaits its deadline on the tokio timer instead of blocking the thread.
    pub async fn emit_chirp_async<S>(
        &self,
        sink: &mut S,
        end_frequency: f64,
        duration: f64,
    ) -> ChirpResult<EmissionReport>
    where
        S: SampleSink + ?Sized,
    {
        let waveform = self.waveform(end_frequency, duration)?;
        let origin = tokio::time::Instant::now();
        let mut written = 0;
        for (index, value) in waveform.quantized(sink.range()).enumerate() {
            tokio::time::sleep_until(origin + waveform.offset(index)).await;
            sink.write_sample(self.channel, value)?;
            written += 1;
        }
        tokio::time::sleep_until(origin + waveform.offset(written)).await;
        sink.write_sample(self.channel, NEUTRAL_LEVEL)?;
        Ok(self.report(&waveform, written))
    }

    fn report(&self, waveform: &ChirpWaveform, written: usize) -> EmissionReport {
        let sweep = waveform.sweep();
        self.logger.record(&format!(
            "emitted {} samples {:.0}->{:.0} Hz at {:.0} Hz",
            written,
            sweep.start_frequency(),
            sweep.end_frequency(),
            waveform.sample_rate()
        ));
        EmissionReport {
            sweep,
            sample_rate: waveform.sample_rate(),
            interval_secs: waveform.interval_secs(),
            samples_written: written,
        }
    }
}
