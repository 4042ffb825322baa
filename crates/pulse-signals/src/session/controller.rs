//! Measurement session state machine
//!
//! ```text
//! Idle --start--> Running --timeout--> Completed --restart--> Running
//!                    |
//!                    +--cancel--> Idle
//! ```
//!
//! The controller is pure state: it never touches the camera or the clock.
//! The monitor feeds it estimates and one-second ticks.

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::SessionConfig;
use crate::error::{Result, RppgError};
use crate::rppg::Estimate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Running,
    Completed,
}

/// How a completed session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "bpm", rename_all = "snake_case")]
pub enum SessionOutcome {
    /// Rounded mean of every collected estimate
    Measured(u32),
    /// No usable estimate was collected. Reported as `final_bpm = 0`,
    /// which must be shown as a failed reading, not as 0 BPM.
    NoReading,
}

impl SessionOutcome {
    /// Wire value: the measured BPM, or the `0` failure sentinel
    pub fn final_bpm(self) -> u32 {
        match self {
            Self::Measured(bpm) => bpm,
            Self::NoReading => 0,
        }
    }

    pub fn is_reading(self) -> bool {
        matches!(self, Self::Measured(_))
    }
}

/// Fixed-duration measurement session
#[derive(Debug, Clone)]
pub struct MeasurementSession {
    duration_seconds: u32,
    state: SessionState,
    seconds_remaining: u32,
    collected_bpm: Vec<u32>,
    outcome: Option<SessionOutcome>,
}

impl MeasurementSession {
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_duration(config.duration_seconds)
    }

    pub fn with_duration(duration_seconds: u32) -> Self {
        Self {
            duration_seconds,
            state: SessionState::Idle,
            seconds_remaining: duration_seconds,
            collected_bpm: Vec::new(),
            outcome: None,
        }
    }

    /// Idle/Completed -> Running
    pub fn start(&mut self) -> Result<()> {
        self.begin("start")
    }

    /// Completed -> Running, identical to a fresh start
    pub fn restart(&mut self) -> Result<()> {
        self.begin("restart")
    }

    pub(crate) fn begin(&mut self, command: &'static str) -> Result<()> {
        if self.state == SessionState::Running {
            warn!("session: {} rejected, already running", command);
            return Err(RppgError::InvalidTransition {
                from: self.state,
                command,
            });
        }
        self.collected_bpm.clear();
        self.outcome = None;
        self.seconds_remaining = self.duration_seconds;
        self.state = SessionState::Running;
        info!("session: {} ({} s)", command, self.duration_seconds);
        Ok(())
    }

    /// Running -> Idle, discarding collected estimates.
    ///
    /// Returns `false` (and does nothing) when not running.
    pub fn cancel(&mut self) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        info!(
            "session: cancelled with {} s remaining, {} estimates discarded",
            self.seconds_remaining,
            self.collected_bpm.len()
        );
        self.collected_bpm.clear();
        self.outcome = None;
        self.seconds_remaining = self.duration_seconds;
        self.state = SessionState::Idle;
        true
    }

    /// Append one heart-rate reading; ignored unless running
    pub fn record(&mut self, bpm: u32) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        self.collected_bpm.push(bpm);
        true
    }

    /// Append an estimate's heart rate if it is available
    pub fn record_estimate(&mut self, estimate: &Estimate) -> bool {
        match estimate.heart_rate_bpm {
            Some(bpm) => self.record(bpm),
            None => false,
        }
    }

    /// One elapsed second. Returns the outcome when this tick completes the
    /// session.
    pub fn tick(&mut self) -> Option<SessionOutcome> {
        if self.state != SessionState::Running {
            return None;
        }
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        debug!("session: {} s remaining", self.seconds_remaining);
        if self.seconds_remaining == 0 {
            return Some(self.complete());
        }
        None
    }

    fn complete(&mut self) -> SessionOutcome {
        let outcome = match mean_bpm(&self.collected_bpm) {
            Some(bpm) => SessionOutcome::Measured(bpm),
            None => SessionOutcome::NoReading,
        };
        self.outcome = Some(outcome);
        self.state = SessionState::Completed;
        match outcome {
            SessionOutcome::Measured(bpm) => info!(
                "session: completed, {} BPM from {} estimates",
                bpm,
                self.collected_bpm.len()
            ),
            SessionOutcome::NoReading => warn!("session: completed without a usable reading"),
        }
        outcome
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    pub fn collected_bpm(&self) -> &[u32] {
        &self.collected_bpm
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    /// `Some(bpm)` after completion (`Some(0)` for no reading), else `None`
    pub fn final_bpm(&self) -> Option<u32> {
        self.outcome.map(SessionOutcome::final_bpm)
    }
}

impl Default for MeasurementSession {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

/// Rounded arithmetic mean; `None` for no readings
fn mean_bpm(readings: &[u32]) -> Option<u32> {
    if readings.is_empty() {
        return None;
    }
    let sum: u64 = readings.iter().map(|&b| u64::from(b)).sum();
    Some((sum as f64 / readings.len() as f64).round() as u32)
}
