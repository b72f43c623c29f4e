use crate::workflow::runner::WorkflowResult;
use chirpcore::processing::{CycleReading, PeakStatus};
use chirpcore::telemetry::MetricsSnapshot;
use serde::{Deserialize, Serialize};

/// Readings kept for downstream consumers.
pub const MAX_HISTORY: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingSummary {
    pub frequency_hz: f64,
    pub velocity: f64,
    pub status: PeakStatus,
    pub lag: Option<usize>,
    pub samples_out: usize,
    pub samples_in: usize,
}

impl From<&CycleReading> for ReadingSummary {
    fn from(reading: &CycleReading) -> Self {
        Self {
            frequency_hz: reading.end_frequency,
            velocity: reading.estimate.velocity,
            status: reading.estimate.status,
            lag: reading.estimate.peak.map(|peak| peak.lag),
            samples_out: reading.emission.samples_written,
            samples_in: reading.estimate.sample_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ReadingsModel {
    pub readings: Vec<ReadingSummary>,
    pub metrics: MetricsSnapshot,
}

impl ReadingsModel {
    pub fn from_result(result: &WorkflowResult) -> Self {
        let mut model = Self {
            metrics: result.metrics,
            ..Default::default()
        };
        for reading in &result.readings {
            model.push(reading);
        }
        model
    }

    /// Appends a reading, dropping the oldest beyond [`MAX_HISTORY`].
    pub fn push(&mut self, reading: &CycleReading) {
        self.readings.push(ReadingSummary::from(reading));
        if self.readings.len() > MAX_HISTORY {
            let excess = self.readings.len() - MAX_HISTORY;
            self.readings.drain(..excess);
        }
    }

    /// Most recent velocity measured at `frequency_hz`.
    pub fn latest_velocity(&self, frequency_hz: f64) -> Option<f64> {
        self.readings
            .iter()
            .rev()
            .find(|summary| summary.frequency_hz == frequency_hz)
            .map(|summary| summary.velocity)
    }
}
