//! Sliding cross-correlation over an explicit set of candidate lags.
//!
//! Inputs are already widened to `i64`, so a window of full-scale 16-bit
//! products can run to billions of samples before the sum saturates.

use ndarray::{s, ArrayView1};
use serde::{Deserialize, Serialize};

/// Best alignment found by the matched filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationPeak {
    pub lag: usize,
    pub score: i64,
}

/// `Σ reference[i] · captured[i + lag]` over the overlapping samples.
pub fn lag_score(reference: ArrayView1<i64>, captured: ArrayView1<i64>, lag: usize) -> i64 {
    if lag >= captured.len() {
        return 0;
    }
    let overlap = reference.len().min(captured.len() - lag);
    reference
        .slice(s![..overlap])
        .dot(&captured.slice(s![lag..lag + overlap]))
}

/// Scans lags `0..=max_lag`, keeping only the running maximum.
///
/// A lag wins only by beating the previous best strictly, starting from a
/// zero baseline, so ties resolve to the smallest lag and a window with no
/// positive score yields `None`.
pub fn best_lag(
    reference: ArrayView1<i64>,
    captured: ArrayView1<i64>,
    max_lag: usize,
) -> Option<CorrelationPeak> {
    let last_lag = max_lag.min(captured.len().saturating_sub(1));
    let mut best: Option<CorrelationPeak> = None;
    for lag in 0..=last_lag {
        let score = lag_score(reference, captured, lag);
        if score > best.map_or(0, |peak| peak.score) {
            best = Some(CorrelationPeak { lag, score });
        }
    }
    best
}

/// Same selection rule as [`best_lag`] over precomputed scores indexed by lag.
pub fn peak_of(scores: &[i64]) -> Option<CorrelationPeak> {
    scores
        .iter()
        .enumerate()
        .fold(None, |best: Option<CorrelationPeak>, (lag, &score)| {
            if score > best.map_or(0, |peak| peak.score) {
                Some(CorrelationPeak { lag, score })
            } else {
                best
            }
        })
}
