//! Measurement session: scheduling, state machine and the monitor runtime
//!
//! # Example
//!
//! ```
//! use pulse_signals::clock::ManualClock;
//! use pulse_signals::config::RppgConfig;
//! use pulse_signals::session::{RppgMonitor, SessionOutcome};
//! use pulse_signals::vision::{SyntheticCamera, SyntheticScene};
//!
//! let clock = ManualClock::new();
//! let mut config = RppgConfig::default();
//! config.session.duration_seconds = 8;
//! let camera = SyntheticCamera::new(clock.clone(), SyntheticScene::default());
//! let mut monitor = RppgMonitor::new(config, camera, clock).unwrap();
//! let updates = monitor.subscribe();
//!
//! monitor.start_session().unwrap();
//! let outcome = monitor.run_to_completion(1000.0 / 60.0);
//! assert!(matches!(outcome, Some(SessionOutcome::Measured(_))));
//! assert!(updates.try_iter().count() > 0);
//! ```

mod controller;
mod monitor;
mod scheduler;

pub use controller::{MeasurementSession, SessionOutcome, SessionState};
pub use monitor::{RppgMonitor, Snapshot, TurnReport};
pub use scheduler::{FrameSampler, SecondTicker};
