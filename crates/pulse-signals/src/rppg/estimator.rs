//! Zero-crossing heart-rate estimator
//!
//! Counts sign changes of the detrended green signal. Each full pulse cycle
//! contributes two crossings, so `bpm = crossings / 2 / duration_s * 60`.
//! Coarse but total: it never divides by a zero duration and reports
//! [`Estimate::unavailable`] until enough samples are buffered.

use log::debug;
use ndarray::ArrayView1;

use super::window::SampleWindow;
use crate::config::{EstimationConfig, MIN_ESTIMATION_SAMPLES};
use crate::dsp::{actual_sample_rate, detrend, QualityLabel, SignalQualityAnalyzer};

/// Instantaneous heart-rate estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Clamped, rounded BPM; `None` while not yet available
    pub heart_rate_bpm: Option<u32>,
    /// Heuristic quality in [0, 100]
    pub quality_percent: f64,
}

impl Estimate {
    /// "Not yet available": no heart rate, zero quality
    pub const fn unavailable() -> Self {
        Self {
            heart_rate_bpm: None,
            quality_percent: 0.0,
        }
    }

    pub fn is_available(&self) -> bool {
        self.heart_rate_bpm.is_some()
    }

    pub fn quality_label(&self) -> QualityLabel {
        QualityLabel::from_percent(self.quality_percent)
    }
}

impl Default for Estimate {
    fn default() -> Self {
        Self::unavailable()
    }
}

/// Count sign changes between consecutive samples; exact zero counts as
/// non-negative.
pub fn count_zero_crossings(signal: ArrayView1<f64>) -> usize {
    signal
        .windows(2)
        .into_iter()
        .filter(|pair| {
            let (prev, cur) = (pair[0], pair[1]);
            (prev < 0.0 && cur >= 0.0) || (prev >= 0.0 && cur < 0.0)
        })
        .count()
}

/// Heart-rate estimator over a [`SampleWindow`]
#[derive(Debug, Clone)]
pub struct HeartRateEstimator {
    min_heart_rate: u32,
    max_heart_rate: u32,
    quality: SignalQualityAnalyzer,
}

impl HeartRateEstimator {
    pub fn new(config: &EstimationConfig) -> Self {
        Self {
            min_heart_rate: config.min_heart_rate,
            max_heart_rate: config.max_heart_rate,
            quality: SignalQualityAnalyzer::new(config.quality_scale),
        }
    }

    /// Heart-rate bounds `(min, max)` applied to every estimate
    pub fn bounds(&self) -> (u32, u32) {
        (self.min_heart_rate, self.max_heart_rate)
    }

    /// Estimate from the current window contents
    pub fn estimate(&self, window: &SampleWindow) -> Estimate {
        let intensities = window.intensities();
        let timestamps = window.timestamps();
        self.estimate_from(intensities.view(), timestamps.view())
    }

    /// Estimate from parallel intensity / timestamp sequences.
    ///
    /// Requires at least 64 samples spanning a positive duration.
    pub fn estimate_from(&self, intensities: ArrayView1<f64>, timestamps: ArrayView1<f64>) -> Estimate {
        let n = intensities.len();
        if n < MIN_ESTIMATION_SAMPLES || timestamps.len() != n {
            return Estimate::unavailable();
        }

        let first = timestamps[0];
        let last = timestamps[n - 1];
        let Some(fs) = actual_sample_rate(n, first, last) else {
            return Estimate::unavailable();
        };
        let duration_s = (last - first) / 1000.0;

        let detrended = detrend(intensities, fs);
        let crossings = count_zero_crossings(detrended.view());
        let raw_bpm = crossings as f64 / 2.0 / duration_s * 60.0;
        let bpm = self.clamp_bpm(raw_bpm);
        let quality = self.quality.analyze(detrended.view());

        debug!(
            "estimate: n={} fs={:.1} crossings={} raw={:.1} bpm={} quality={:.1}",
            n, fs, crossings, raw_bpm, bpm, quality.percent
        );

        Estimate {
            heart_rate_bpm: Some(bpm),
            quality_percent: quality.percent,
        }
    }

    fn clamp_bpm(&self, raw_bpm: f64) -> u32 {
        let clamped = raw_bpm.clamp(f64::from(self.min_heart_rate), f64::from(self.max_heart_rate));
        clamped.round() as u32
    }
}

impl Default for HeartRateEstimator {
    fn default() -> Self {
        Self::new(&EstimationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};
    use std::f64::consts::PI;

    fn sine_window(freq_hz: f64, fs: f64, n: usize, amplitude: f64) -> SampleWindow {
        let mut w = SampleWindow::new(n);
        for i in 0..n {
            let t_ms = i as f64 * 1000.0 / fs;
            let v = 120.0 + amplitude * (2.0 * PI * freq_hz * t_ms / 1000.0).sin();
            w.push(v, t_ms);
        }
        w
    }

    #[test]
    fn test_zero_crossing_rule() {
        assert_eq!(count_zero_crossings(array![-1.0, 0.0, 1.0].view()), 1);
        assert_eq!(count_zero_crossings(array![0.0, -1.0, 0.0].view()), 2);
        assert_eq!(count_zero_crossings(array![1.0, 0.0, 2.0].view()), 0);
        assert_eq!(count_zero_crossings(Array1::<f64>::zeros(0).view()), 0);
    }

    #[test]
    fn test_sinusoid_recovers_frequency() {
        let est = HeartRateEstimator::default();
        let e = est.estimate(&sine_window(1.2, 30.0, 300, 3.0));
        let bpm = e.heart_rate_bpm.unwrap();
        assert!((66..=78).contains(&bpm), "got {bpm}");
        assert!(e.quality_percent > 0.0);
    }

    #[test]
    fn test_below_minimum_samples_is_unavailable() {
        let est = HeartRateEstimator::default();
        let e = est.estimate(&sine_window(1.2, 30.0, 63, 3.0));
        assert_eq!(e, Estimate::unavailable());
        assert!(!e.is_available());
    }

    #[test]
    fn test_zero_duration_is_unavailable() {
        let est = HeartRateEstimator::default();
        let mut w = SampleWindow::new(100);
        for i in 0..80 {
            w.push(100.0 + (i % 2) as f64, 5000.0);
        }
        assert_eq!(est.estimate(&w), Estimate::unavailable());
    }

    #[test]
    fn test_flat_signal_clamps_to_minimum() {
        let est = HeartRateEstimator::default();
        let mut w = SampleWindow::new(100);
        for i in 0..100 {
            w.push(42.0, i as f64 * 33.0);
        }
        let e = est.estimate(&w);
        assert_eq!(e.heart_rate_bpm, Some(40));
        assert_eq!(e.quality_percent, 0.0);
        assert_eq!(e.quality_label(), QualityLabel::Poor);
    }

    #[test]
    fn test_alternating_signal_clamps_to_maximum() {
        let est = HeartRateEstimator::default();
        let mut w = SampleWindow::new(300);
        for i in 0..300 {
            let v = if i % 2 == 0 { 130.0 } else { 110.0 };
            w.push(v, i as f64 * 1000.0 / 30.0);
        }
        assert_eq!(est.estimate(&w).heart_rate_bpm, Some(180));
    }

    #[test]
    fn test_custom_bounds() {
        let config = EstimationConfig {
            min_heart_rate: 60,
            max_heart_rate: 100,
            ..EstimationConfig::default()
        };
        let est = HeartRateEstimator::new(&config);
        assert_eq!(est.bounds(), (60, 100));
        // 0.5 Hz -> 30 BPM, clamped up to 60
        let e = est.estimate(&sine_window(0.5, 30.0, 300, 3.0));
        assert_eq!(e.heart_rate_bpm, Some(60));
    }
}
