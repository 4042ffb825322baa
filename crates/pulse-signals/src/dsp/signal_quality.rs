//! Signal quality scoring
//!
//! The score is a variance proxy: `stddev(detrended) * scale`, clamped to
//! `[0, 100]`. A stronger pulsatile swing scores higher. It is not an SNR
//! estimate and cannot tell a pulse from motion artifact, so treat it as a
//! coarse "is there any signal at all" indicator.

use ndarray::ArrayView1;
use serde::Serialize;

/// Default multiplier applied to the standard deviation
pub const DEFAULT_QUALITY_SCALE: f64 = 10.0;

/// Presentation bucket for a quality percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLabel {
    Good,
    Fair,
    Poor,
}

impl QualityLabel {
    /// `>= 70` Good, `>= 40` Fair, otherwise Poor
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 70.0 {
            Self::Good
        } else if percent >= 40.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

/// Signal quality assessment result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalQuality {
    /// Population standard deviation of the detrended signal
    pub std_dev: f64,
    /// Clamped score in [0, 100]
    pub percent: f64,
}

impl SignalQuality {
    pub fn label(&self) -> QualityLabel {
        QualityLabel::from_percent(self.percent)
    }
}

/// Variance-based quality scorer
#[derive(Debug, Clone)]
pub struct SignalQualityAnalyzer {
    scale: f64,
}

impl SignalQualityAnalyzer {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    pub fn analyze(&self, detrended: ArrayView1<f64>) -> SignalQuality {
        let std_dev = population_std(detrended);
        SignalQuality {
            std_dev,
            percent: (std_dev * self.scale).clamp(0.0, 100.0),
        }
    }
}

impl Default for SignalQualityAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY_SCALE)
    }
}

/// Population standard deviation; 0.0 for empty input
pub fn population_std(signal: ArrayView1<f64>) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    let std = signal.std(0.0);
    if std.is_finite() {
        std
    } else {
        0.0
    }
}
