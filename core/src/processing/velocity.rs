use crate::math::CorrelationPeak;
use crate::prelude::SweepParameters;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How the correlation peak translated into a velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeakStatus {
    /// Peak at a non-zero lag; velocity derived from it.
    Resolved,
    /// Peak at lag zero; no Doppler offset to measure.
    ZeroLag,
    /// No lag scored above zero.
    NoPositivePeak,
}

/// Result of one analysis pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityEstimate {
    pub velocity: f64,
    pub status: PeakStatus,
    pub peak: Option<CorrelationPeak>,
    pub sample_count: usize,
    pub sample_rate: f64,
}

impl VelocityEstimate {
    pub fn from_peak(
        peak: Option<CorrelationPeak>,
        sweep: &SweepParameters,
        sample_rate: f64,
        sample_count: usize,
    ) -> Self {
        let (velocity, status) = match peak {
            None => (0.0, PeakStatus::NoPositivePeak),
            Some(peak) => match doppler_velocity(sweep, peak.lag, 1.0 / sample_rate) {
                Some(velocity) => (velocity, PeakStatus::Resolved),
                None => (0.0, PeakStatus::ZeroLag),
            },
        };
        Self {
            velocity,
            status,
            peak,
            sample_count,
            sample_rate,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status == PeakStatus::Resolved
    }
}

/// `span · duration / (2π · lag · interval)`; `None` at lag zero, where the
/// expression has no finite value.
pub fn doppler_velocity(sweep: &SweepParameters, lag: usize, interval: f64) -> Option<f64> {
    if lag == 0 {
        return None;
    }
    Some(sweep.span() * sweep.duration() / (2.0 * PI * lag as f64 * interval))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep() -> SweepParameters {
        SweepParameters::new(10e3, 80e3, 0.01).unwrap()
    }

    #[test]
    fn zero_lag_is_reported_not_divided() {
        let peak = CorrelationPeak { lag: 0, score: 10 };
        let estimate = VelocityEstimate::from_peak(Some(peak), &sweep(), 160e3, 1600);
        assert_eq!(estimate.velocity, 0.0);
        assert_eq!(estimate.status, PeakStatus::ZeroLag);
        assert!(!estimate.is_resolved());
    }

    #[test]
    fn missing_peak_yields_zero_velocity() {
        let estimate = VelocityEstimate::from_peak(None, &sweep(), 160e3, 1600);
        assert_eq!(estimate.velocity, 0.0);
        assert_eq!(estimate.status, PeakStatus::NoPositivePeak);
    }

    #[test]
    fn velocity_falls_with_lag() {
        let interval = 1.0 / 160e3;
        let near = doppler_velocity(&sweep(), 1, interval).unwrap();
        let far = doppler_velocity(&sweep(), 4, interval).unwrap();
        assert!((near / far - 4.0).abs() < 1e-9);
        let expected = 70e3 * 0.01 / (2.0 * PI * interval);
        assert!((near - expected).abs() < 1e-6);
    }

    #[test]
    fn zero_span_sweep_has_zero_velocity() {
        let tone = SweepParameters::new(10e3, 10e3, 0.01).unwrap();
        assert_eq!(doppler_velocity(&tone, 3, 1.0 / 20e3), Some(0.0));
    }
}
