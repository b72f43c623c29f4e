pub mod chirp;
pub mod correlation;
pub mod fft;
pub mod stats;

pub use chirp::ChirpWaveform;
pub use correlation::CorrelationPeak;
pub use fft::FftHelper;
pub use stats::StatsHelper;
