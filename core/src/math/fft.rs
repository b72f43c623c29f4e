use num_complex::Complex64;
use rustfft::{num_traits::Zero, Fft, FftPlanner};
use std::sync::Arc;

/// Helper that wraps the `rustfft` planner for FFT-based correlation.
pub struct FftHelper {
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    scratch: Vec<Complex64>,
    size: usize,
}

impl FftHelper {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        let scratch = vec![Complex64::zero(); scratch_len];
        Self {
            forward,
            inverse,
            scratch,
            size,
        }
    }

    /// Transform length that keeps a linear correlation of the two inputs
    /// free of circular wrap-around.
    pub fn correlation_size(reference_len: usize, captured_len: usize) -> usize {
        (reference_len + captured_len).max(1).next_power_of_two()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Zero-pads (or truncates) `input` to the transform size and runs the
    /// forward FFT.
    pub fn forward(&mut self, input: &[i64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = input
            .iter()
            .take(self.size())
            .map(|&value| Complex64::new(value as f64, 0.0))
            .collect();
        buffer.resize(self.size(), Complex64::zero());
        self.forward.process_with_scratch(&mut buffer, &mut self.scratch);
        buffer
    }

    /// Scores for lags `0..=max_lag` of `Σ reference[i] · captured[i + lag]`,
    /// rounded back to integers.
    pub fn cross_correlate(
        &mut self,
        reference: &[i64],
        captured: &[i64],
        max_lag: usize,
    ) -> Vec<i64> {
        if captured.is_empty() {
            return Vec::new();
        }
        let reference_spectrum = self.forward(reference);
        let captured_spectrum = self.forward(captured);
        let mut product: Vec<Complex64> = reference_spectrum
            .iter()
            .zip(&captured_spectrum)
            .map(|(r, c)| r.conj() * c)
            .collect();
        self.inverse.process_with_scratch(&mut product, &mut self.scratch);

        let scale = self.size() as f64;
        let last_lag = max_lag.min(captured.len() - 1);
        product[..=last_lag]
            .iter()
            .map(|value| (value.re / scale).round() as i64)
            .collect()
    }
}
