pub mod buffer_pool;
pub mod correlator;
pub mod cycle;
pub mod synthesizer;
pub mod velocity;

pub use buffer_pool::BufferPool;
pub use correlator::EchoCorrelator;
pub use cycle::{CycleReading, DeviceSetup, MeasurementCycle, Peripherals};
pub use synthesizer::{ChirpSynthesizer, EmissionReport, NEUTRAL_LEVEL};
pub use velocity::{PeakStatus, VelocityEstimate};
