//! # pulse-signals
//!
//! Camera-based heart-rate measurement (rPPG).
//!
//! This crate provides:
//! - **Vision**: skin-pixel ROI reduction of camera frames to one green value
//! - **rPPG**: sliding sample window and a zero-crossing heart-rate estimator
//! - **DSP**: moving-average detrend and a variance-based quality score
//! - **Session**: a timed measurement state machine and the `RppgMonitor`
//!   runtime that drives a frame source in cooperative turns
//!
//! Estimates are approximate and not suitable for diagnosis.
//!
//! ## Example
//!
//! ```ignore
//! use pulse_signals::{MonotonicClock, RppgConfig, RppgMonitor};
//!
//! let clock = MonotonicClock::new();
//! let mut monitor = RppgMonitor::new(RppgConfig::default(), camera, clock)?;
//! let snapshots = monitor.subscribe();
//!
//! monitor.start_session()?;
//! while monitor.session().is_running() {
//!     monitor.turn();
//!     for snap in snapshots.try_iter() {
//!         render(&snap);
//!     }
//! }
//! ```

pub mod clock;
pub mod config;
pub mod dsp;
pub mod error;
pub mod rppg;
pub mod session;
pub mod vision;

#[cfg(test)]
mod tests_config;
#[cfg(test)]
mod tests_proptest;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{ConfigError, RppgConfig};
pub use dsp::QualityLabel;
pub use error::{Result, RppgError};
pub use rppg::{Estimate, HeartRateEstimator, SampleWindow};
pub use session::{MeasurementSession, RppgMonitor, SessionOutcome, SessionState, Snapshot};
pub use vision::{Frame, FrameSource, PixelLayout, RegionExtractor, SyntheticCamera, SyntheticScene};
