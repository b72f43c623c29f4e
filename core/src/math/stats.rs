pub struct StatsHelper;

impl StatsHelper {
    pub fn rms(samples: &[i64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = samples.iter().map(|&v| (v as f64) * (v as f64)).sum();
        (sum_sq / samples.len() as f64).sqrt()
    }

    /// Largest absolute deviation from zero.
    pub fn peak(samples: &[i64]) -> i64 {
        samples.iter().map(|v| v.abs()).max().unwrap_or(0)
    }
}
