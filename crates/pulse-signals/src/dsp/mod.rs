//! DSP (Digital Signal Processing) module
//!
//! - `detrend` - moving-average baseline removal at the measured sample rate
//! - `SignalQualityAnalyzer` - variance-based quality score and labels

mod detrend;
mod signal_quality;

pub use detrend::{actual_sample_rate, detrend, half_window, MIN_DETREND_LEN};
pub use signal_quality::{
    population_std, QualityLabel, SignalQuality, SignalQualityAnalyzer, DEFAULT_QUALITY_SCALE,
};
