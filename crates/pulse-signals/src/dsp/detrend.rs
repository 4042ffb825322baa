//! Moving-average detrend
//!
//! Subtracts a local mean from every sample, a cheap high-pass that removes
//! slow illumination drift while keeping the 0.7-3 Hz pulse band. The
//! half-width is two seconds' worth of samples at the *measured* sample
//! rate, so frame-rate jitter is absorbed instead of assumed away.

use ndarray::{s, Array1, ArrayView1};

/// Shortest input that is detrended; shorter inputs are returned unchanged
pub const MIN_DETREND_LEN: usize = 4;

/// Window half-width in seconds
const HALF_WINDOW_SECONDS: f64 = 2.0;

/// Effective sample rate of `n` samples spanning `first_ms..=last_ms`.
///
/// Returns `None` when the span is not strictly positive.
pub fn actual_sample_rate(n: usize, first_ms: f64, last_ms: f64) -> Option<f64> {
    let duration_s = (last_ms - first_ms) / 1000.0;
    if n == 0 || !duration_s.is_finite() || duration_s <= 0.0 {
        return None;
    }
    Some(n as f64 / duration_s)
}

/// Half-width (in samples) of the local-mean window
#[inline]
pub fn half_window(actual_sample_rate: f64) -> usize {
    (actual_sample_rate * HALF_WINDOW_SECONDS).floor().max(0.0) as usize
}

/// Detrend `signal` using a local mean over `[i - w, i + w)`, clamped to
/// the buffer bounds, where `w = floor(actual_sample_rate * 2)`.
pub fn detrend(signal: ArrayView1<f64>, actual_sample_rate: f64) -> Array1<f64> {
    let n = signal.len();
    if n < MIN_DETREND_LEN {
        return signal.to_owned();
    }

    let w = half_window(actual_sample_rate);
    let mut result = Array1::zeros(n);

    for i in 0..n {
        let start = i.saturating_sub(w);
        let end = (i + w).min(n);
        // w == 0 gives an empty window; fall back to the sample itself
        let local_mean = if end > start {
            signal.slice(s![start..end]).mean().unwrap_or(signal[i])
        } else {
            signal[i]
        };
        result[i] = signal[i] - local_mean;
    }

    result
}
