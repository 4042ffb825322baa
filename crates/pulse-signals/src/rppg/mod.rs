//! Remote Photoplethysmography (rPPG) module
//!
//! Green-channel pulse estimation from a rolling window of samples.
//!
//! - `SampleWindow` - fixed-capacity FIFO of `(intensity, timestamp)` samples
//! - `HeartRateEstimator` - detrend + zero-crossing BPM with a variance quality score
//! - `Estimate` - instantaneous result, `Estimate::unavailable()` until ready

mod estimator;
mod window;

pub use estimator::{count_zero_crossings, Estimate, HeartRateEstimator};
pub use window::{Sample, SampleWindow};
