use super::{AmplitudeRange, Channel, PeripheralError};

/// Waveform-generating output, e.g. a DAC channel.
pub trait SampleSink {
    /// One-time channel setup, called before any cycle.
    fn enable(&mut self, channel: Channel) -> Result<(), PeripheralError>;
    fn write_sample(&mut self, channel: Channel, value: u16) -> Result<(), PeripheralError>;
    fn range(&self) -> AmplitudeRange;
}

/// In-memory sink that keeps every written value.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    range: AmplitudeRange,
    enabled: Vec<Channel>,
    written: Vec<u16>,
}

impl RecordingSink {
    pub fn new(range: AmplitudeRange) -> Self {
        Self {
            range,
            enabled: Vec::new(),
            written: Vec::new(),
        }
    }

    pub fn samples(&self) -> &[u16] {
        &self.written
    }

    /// Drains the recorded values, leaving the sink enabled.
    pub fn take(&mut self) -> Vec<u16> {
        std::mem::take(&mut self.written)
    }
}

impl SampleSink for RecordingSink {
    fn enable(&mut self, channel: Channel) -> Result<(), PeripheralError> {
        if !self.enabled.contains(&channel) {
            self.enabled.push(channel);
        }
        Ok(())
    }

    fn write_sample(&mut self, channel: Channel, value: u16) -> Result<(), PeripheralError> {
        if !self.enabled.contains(&channel) {
            return Err(PeripheralError::ChannelDisabled(channel));
        }
        if !self.range.contains(value) {
            return Err(PeripheralError::OutOfRange {
                value,
                max: self.range.max(),
            });
        }
        self.written.push(value);
        Ok(())
    }

    fn range(&self) -> AmplitudeRange {
        self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_require_enabled_channel() {
        let mut sink = RecordingSink::new(AmplitudeRange::EIGHT_BIT);
        assert_eq!(
            sink.write_sample(Channel(1), 10),
            Err(PeripheralError::ChannelDisabled(Channel(1)))
        );
        sink.enable(Channel(1)).unwrap();
        sink.write_sample(Channel(1), 10).unwrap();
        assert_eq!(sink.samples(), &[10]);
    }

    #[test]
    fn out_of_range_values_are_refused() {
        let mut sink = RecordingSink::new(AmplitudeRange::EIGHT_BIT);
        sink.enable(Channel(1)).unwrap();
        assert!(sink.write_sample(Channel(1), 256).is_err());
        assert!(sink.take().is_empty());
    }
}
