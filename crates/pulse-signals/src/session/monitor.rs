//! Monitor runtime
//!
//! Owns every pipeline stage plus the frame source and drives them in
//! cooperative turns:
//!
//! 1. poll the source, rate-gate, extract, buffer, estimate, record, publish
//! 2. fire any due one-second ticks, possibly completing the session
//!
//! Frames are handled before ticks within a turn, so a completing tick
//! always sees the most recently recorded estimate. The frame source is
//! closed on cancel, completion, dispose and drop.

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info, trace, warn};
use serde::Serialize;

use super::controller::{MeasurementSession, SessionOutcome, SessionState};
use super::scheduler::{FrameSampler, SecondTicker};
use crate::clock::Clock;
use crate::config::RppgConfig;
use crate::dsp::QualityLabel;
use crate::error::{Result, RppgError};
use crate::rppg::{Estimate, HeartRateEstimator, SampleWindow};
use crate::vision::{Frame, FrameSource, RegionExtractor};

/// Point-in-time view published to subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Clock time of publication (ms)
    pub timestamp_ms: f64,
    /// Latest available estimate of the running session
    pub heart_rate_bpm: Option<u32>,
    pub quality_percent: f64,
    pub quality_label: QualityLabel,
    pub seconds_remaining: u32,
    pub state: SessionState,
    /// Set once completed; `Some(0)` means no usable reading
    pub final_bpm: Option<u32>,
    pub outcome: Option<SessionOutcome>,
    /// Window fill ratio (0-1)
    pub buffer_fill: f64,
    /// Last frame-source error, cleared on a successful start
    pub error: Option<String>,
}

/// What happened during one [`RppgMonitor::turn`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnReport {
    /// A frame was admitted and buffered
    pub sample_buffered: bool,
    /// Session seconds elapsed this turn
    pub ticks: u32,
    /// Set when this turn completed the session
    pub completed: Option<SessionOutcome>,
}

/// Heart-rate monitor over one frame source
pub struct RppgMonitor<S: FrameSource, C: Clock> {
    config: RppgConfig,
    source: S,
    clock: C,
    sampler: FrameSampler,
    extractor: RegionExtractor,
    window: SampleWindow,
    estimator: HeartRateEstimator,
    session: MeasurementSession,
    ticker: SecondTicker,
    latest: Estimate,
    last_error: Option<String>,
    subscribers: Vec<Sender<Snapshot>>,
}

impl<S: FrameSource, C: Clock> RppgMonitor<S, C> {
    /// Build a monitor; the source stays closed until a session starts.
    pub fn new(config: RppgConfig, source: S, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sampler: FrameSampler::new(config.sampling.sample_rate),
            extractor: RegionExtractor::new(config.roi.clone()),
            window: SampleWindow::new(config.max_samples()),
            estimator: HeartRateEstimator::new(&config.estimation),
            session: MeasurementSession::new(&config.session),
            ticker: SecondTicker::new(),
            latest: Estimate::unavailable(),
            last_error: None,
            subscribers: Vec::new(),
            config,
            source,
            clock,
        })
    }

    /// Register a snapshot subscriber. Dropped receivers are pruned on the
    /// next publish.
    pub fn subscribe(&mut self) -> Receiver<Snapshot> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn start_session(&mut self) -> Result<()> {
        self.begin("start")
    }

    pub fn restart_session(&mut self) -> Result<()> {
        self.begin("restart")
    }

    fn begin(&mut self, command: &'static str) -> Result<()> {
        let from = self.session.state();
        if from == SessionState::Running {
            warn!("monitor: {} rejected, session already running", command);
            return Err(RppgError::InvalidTransition { from, command });
        }

        if let Err(e) = self.source.open(&self.config.camera) {
            warn!("monitor: {} failed: {}", command, e);
            self.last_error = Some(e.to_string());
            self.publish();
            return Err(e);
        }

        self.window.clear();
        self.sampler.reset();
        self.latest = Estimate::unavailable();
        self.last_error = None;
        self.session.begin(command)?;
        self.ticker.start(self.clock.now_ms());
        info!("monitor: sampling at {} Hz", self.config.sampling.sample_rate);
        self.publish();
        Ok(())
    }

    /// Stop a running session without a result. Returns `false` when there
    /// was nothing to cancel.
    pub fn cancel_session(&mut self) -> bool {
        if !self.session.cancel() {
            return false;
        }
        self.release();
        self.window.clear();
        self.sampler.reset();
        self.latest = Estimate::unavailable();
        self.publish();
        true
    }

    /// Cancel any running session and release the frame source
    pub fn dispose(&mut self) {
        if !self.cancel_session() {
            self.release();
        }
    }

    /// One cooperative scheduler turn
    pub fn turn(&mut self) -> TurnReport {
        let mut report = TurnReport::default();
        if !self.session.is_running() {
            return report;
        }

        if let Some(frame) = self.source.poll_frame() {
            report.sample_buffered = self.ingest_frame(&frame);
        }

        // Countdown only advances while frames are being processed
        if self.session.is_running() && self.source.is_open() {
            let due = self.ticker.due_ticks(self.clock.now_ms());
            for _ in 0..due {
                report.ticks += 1;
                let outcome = self.session.tick();
                if let Some(outcome) = outcome {
                    report.completed = Some(outcome);
                    self.release();
                }
                self.publish();
                if outcome.is_some() {
                    break;
                }
            }
        }

        report
    }

    /// Push a frame from an external capture loop.
    ///
    /// Frames delivered while no session is running are dropped. Returns
    /// whether the frame produced a buffered sample.
    pub fn ingest_frame(&mut self, frame: &Frame) -> bool {
        if !self.session.is_running() {
            trace!("monitor: dropping frame, no running session");
            return false;
        }

        let now = self.clock.now_ms();
        if !self.sampler.admit(now) {
            return false;
        }

        let intensity = self.extractor.extract(frame);
        if intensity <= 0.0 {
            trace!("monitor: no skin pixels in ROI, frame skipped");
            return false;
        }

        self.window.push(intensity, now);

        if self.window.len() >= self.config.min_analysis_samples() {
            let estimate = self.estimator.estimate(&self.window);
            if estimate.is_available() {
                self.latest = estimate;
                self.session.record_estimate(&estimate);
            }
        }

        self.publish();
        true
    }

    /// Drive turns until the session leaves `Running`, sleeping `step_ms`
    /// on the clock between turns.
    pub fn run_to_completion(&mut self, step_ms: f64) -> Option<SessionOutcome> {
        while self.session.is_running() {
            self.turn();
            if self.session.is_running() {
                self.clock.sleep_ms(step_ms);
            }
        }
        self.session.outcome()
    }

    /// Current state as a snapshot
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            timestamp_ms: self.clock.now_ms(),
            heart_rate_bpm: self.latest.heart_rate_bpm,
            quality_percent: self.latest.quality_percent,
            quality_label: self.latest.quality_label(),
            seconds_remaining: self.session.seconds_remaining(),
            state: self.session.state(),
            final_bpm: self.session.final_bpm(),
            outcome: self.session.outcome(),
            buffer_fill: self.window.fill_ratio(),
            error: self.last_error.clone(),
        }
    }

    pub fn session(&self) -> &MeasurementSession {
        &self.session
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    pub fn latest_estimate(&self) -> Estimate {
        self.latest
    }

    pub fn config(&self) -> &RppgConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn release(&mut self) {
        self.ticker.stop();
        if self.source.is_open() {
            debug!("monitor: releasing frame source");
            self.source.close();
        }
    }

    fn publish(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }
}

impl<S: FrameSource, C: Clock> Drop for RppgMonitor<S, C> {
    fn drop(&mut self) {
        self.release();
    }
}
