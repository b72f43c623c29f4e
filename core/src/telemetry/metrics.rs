use serde::Serialize;
use std::sync::Mutex;

/// Counters shared between the measurement loop and reporting.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub cycles: usize,
    pub rejected: usize,
    pub faults: usize,
    pub zero_lag_peaks: usize,
    pub missing_peaks: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_cycle(&self) {
        self.update(|metrics| metrics.cycles += 1);
    }

    /// Inputs refused before the cycle touched any peripheral.
    pub fn record_rejected(&self) {
        self.update(|metrics| metrics.rejected += 1);
    }

    pub fn record_fault(&self) {
        self.update(|metrics| metrics.faults += 1);
    }

    pub fn record_zero_lag(&self) {
        self.update(|metrics| metrics.zero_lag_peaks += 1);
    }

    pub fn record_missing_peak(&self) {
        self.update(|metrics| metrics.missing_peaks += 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }

    fn update<F: FnOnce(&mut MetricsSnapshot)>(&self, apply: F) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
