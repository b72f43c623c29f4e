//! Collaborator contracts for the waveform generator, the digitizer, and the
//! real-time wait, plus simulated implementations used offline.

pub mod amplitude;
pub mod pacing;
pub mod sink;
pub mod source;

pub use amplitude::{AmplitudeRange, Attenuation};
pub use pacing::{FreeRunningPacer, Pacer, ThreadPacer};
pub use sink::{RecordingSink, SampleSink};
pub use source::{ReplaySource, SampleSource};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hardware channel index on the DAC or ADC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel(pub u8);

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

/// Faults reported by a sink or source.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PeripheralError {
    #[error("channel {0} is not enabled")]
    ChannelDisabled(Channel),
    #[error("sample {value} outside 0..={max}")]
    OutOfRange { value: u16, max: u16 },
    #[error("source has not been configured")]
    NotConfigured,
    #[error("unsupported resolution of {0} bits")]
    UnsupportedResolution(u8),
}
