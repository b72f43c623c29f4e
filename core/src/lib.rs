//! Chirp synthesis and matched-filter Doppler estimation for the ultrasonic
//! ranging device.
//!
//! A cycle emits a linear up-chirp through a [`peripheral::SampleSink`],
//! captures the echo from a [`peripheral::SampleSource`], and scores it
//! against a reference sweep built from the same [`SweepParameters`].

pub mod math;
pub mod peripheral;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use prelude::{ChirpError, ChirpResult, SignalConfig, SweepParameters};
pub use processing::{ChirpSynthesizer, EchoCorrelator, MeasurementCycle, VelocityEstimate};
