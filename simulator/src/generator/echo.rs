use chirpcore::math::ChirpWaveform;
use chirpcore::peripheral::{
    AmplitudeRange, Attenuation, Channel, PeripheralError, ReplaySource, SampleSource,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Single reflector seen by the simulated digitizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoConfig {
    /// Round-trip delay in capture samples.
    pub delay_samples: usize,
    /// Echo amplitude relative to full scale.
    pub attenuation: f64,
    /// Peak uniform noise, relative to full scale.
    pub noise: f64,
    pub seed: u64,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            delay_samples: 24,
            attenuation: 0.6,
            noise: 0.05,
            seed: 0,
        }
    }
}

/// Digitizer whose next capture holds a delayed, attenuated, noisy copy of
/// the sweep it was armed with.
pub struct SimulatedEchoSource {
    config: EchoConfig,
    rng: StdRng,
    replay: ReplaySource,
}

impl SimulatedEchoSource {
    pub fn new(config: EchoConfig, range: AmplitudeRange) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            rng,
            replay: ReplaySource::new(range),
        }
    }

    /// Replaces any pending readings with the echo of `waveform`.
    pub fn arm(&mut self, waveform: &ChirpWaveform) {
        let range = self.replay.range();
        let count = waveform.sample_count();
        let mut codes = Vec::with_capacity(count);
        for index in 0..count {
            let echo = index
                .checked_sub(self.config.delay_samples)
                .map(|source_index| self.config.attenuation * waveform.unit_sample(source_index))
                .unwrap_or(0.0);
            let jitter = if self.config.noise > 0.0 {
                self.rng.gen_range(-self.config.noise..self.config.noise)
            } else {
                0.0
            };
            codes.push(range.quantize(echo + jitter));
        }
        self.replay.clear();
        self.replay.load(codes);
    }
}

impl SampleSource for SimulatedEchoSource {
    fn configure(
        &mut self,
        range: AmplitudeRange,
        attenuation: Attenuation,
    ) -> Result<(), PeripheralError> {
        self.replay.configure(range, attenuation)
    }

    fn read_sample(&mut self, channel: Channel) -> Result<u16, PeripheralError> {
        self.replay.read_sample(channel)
    }

    fn range(&self) -> AmplitudeRange {
        self.replay.range()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirpcore::prelude::{PhaseModel, SweepParameters};

    fn waveform() -> ChirpWaveform {
        let sweep = SweepParameters::new(10e3, 80e3, 0.001).unwrap();
        ChirpWaveform::new(sweep, 160e3, PhaseModel::Direct)
    }

    #[test]
    fn echo_is_silent_until_the_delay() {
        let config = EchoConfig {
            delay_samples: 10,
            noise: 0.0,
            ..Default::default()
        };
        let mut source = SimulatedEchoSource::new(config, AmplitudeRange::TWELVE_BIT);
        source
            .configure(AmplitudeRange::TWELVE_BIT, Attenuation::Db0)
            .unwrap();
        source.arm(&waveform());

        let readings: Vec<u16> = (0..160)
            .map(|_| source.read_sample(Channel(6)).unwrap())
            .collect();
        assert!(readings[..10].iter().all(|&v| v == 2047));
        assert!(readings[10..].iter().any(|&v| v != 2047));
    }

    #[test]
    fn same_seed_produces_same_capture() {
        let capture = || {
            let mut source =
                SimulatedEchoSource::new(EchoConfig::default(), AmplitudeRange::TWELVE_BIT);
            source
                .configure(AmplitudeRange::TWELVE_BIT, Attenuation::Db0)
                .unwrap();
            source.arm(&waveform());
            (0..160)
                .map(|_| source.read_sample(Channel(6)).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(capture(), capture());
    }
}
