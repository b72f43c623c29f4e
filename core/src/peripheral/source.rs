use super::{AmplitudeRange, Attenuation, Channel, PeripheralError};
use std::collections::VecDeque;

/// Digitizing input, e.g. an ADC channel.
pub trait SampleSource {
    /// One-time converter setup, called before any cycle.
    fn configure(
        &mut self,
        range: AmplitudeRange,
        attenuation: Attenuation,
    ) -> Result<(), PeripheralError>;
    fn read_sample(&mut self, channel: Channel) -> Result<u16, PeripheralError>;
    fn range(&self) -> AmplitudeRange;
}

/// Source that replays queued readings, then reads a quiet (mid-scale) line.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    range: AmplitudeRange,
    attenuation: Option<Attenuation>,
    pending: VecDeque<u16>,
    reads: usize,
}

impl ReplaySource {
    pub fn new(range: AmplitudeRange) -> Self {
        Self {
            range,
            attenuation: None,
            pending: VecDeque::new(),
            reads: 0,
        }
    }

    /// Queues readings behind any that are still pending.
    pub fn load<I: IntoIterator<Item = u16>>(&mut self, samples: I) {
        self.pending.extend(samples);
    }

    /// Drops readings that were never consumed.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl SampleSource for ReplaySource {
    fn configure(
        &mut self,
        range: AmplitudeRange,
        attenuation: Attenuation,
    ) -> Result<(), PeripheralError> {
        self.range = range;
        self.attenuation = Some(attenuation);
        Ok(())
    }

    fn read_sample(&mut self, _channel: Channel) -> Result<u16, PeripheralError> {
        if self.attenuation.is_none() {
            return Err(PeripheralError::NotConfigured);
        }
        let value = self
            .pending
            .pop_front()
            .unwrap_or_else(|| self.range.midscale());
        if !self.range.contains(value) {
            return Err(PeripheralError::OutOfRange {
                value,
                max: self.range.max(),
            });
        }
        self.reads += 1;
        Ok(value)
    }

    fn range(&self) -> AmplitudeRange {
        self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_source_refuses_reads() {
        let mut source = ReplaySource::new(AmplitudeRange::TWELVE_BIT);
        assert_eq!(
            source.read_sample(Channel(6)),
            Err(PeripheralError::NotConfigured)
        );
    }

    #[test]
    fn replays_then_idles_at_midscale() {
        let mut source = ReplaySource::new(AmplitudeRange::TWELVE_BIT);
        source
            .configure(AmplitudeRange::TWELVE_BIT, Attenuation::Db0)
            .unwrap();
        source.load([1, 4000]);
        assert_eq!(source.read_sample(Channel(6)).unwrap(), 1);
        assert_eq!(source.read_sample(Channel(6)).unwrap(), 4000);
        assert_eq!(source.read_sample(Channel(6)).unwrap(), 2047);
        assert_eq!(source.reads(), 3);
    }
}
