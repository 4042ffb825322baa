//! Periodic-task primitives for the cooperative monitor loop
//!
//! Both types are passive: they are asked "is it time?" with the current
//! clock reading and never schedule themselves.

/// Float slack when comparing fractional millisecond intervals
const INTERVAL_TOLERANCE_MS: f64 = 1e-6;

/// Rate gate admitting at most one frame per sample interval.
///
/// Frames arriving faster are discarded, not queued. The first frame after a
/// reset is always admitted.
#[derive(Debug, Clone)]
pub struct FrameSampler {
    interval_ms: f64,
    last_accepted_ms: Option<f64>,
}

impl FrameSampler {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            interval_ms: 1000.0 / f64::from(sample_rate.max(1)),
            last_accepted_ms: None,
        }
    }

    /// Admit or reject a frame seen at `now_ms`
    pub fn admit(&mut self, now_ms: f64) -> bool {
        let due = match self.last_accepted_ms {
            None => true,
            Some(last) => now_ms - last + INTERVAL_TOLERANCE_MS >= self.interval_ms,
        };
        if due {
            self.last_accepted_ms = Some(now_ms);
        }
        due
    }

    pub fn reset(&mut self) {
        self.last_accepted_ms = None;
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn last_accepted_ms(&self) -> Option<f64> {
        self.last_accepted_ms
    }
}

/// One-second countdown ticker.
///
/// Ticks are scheduled from the start time, so late polling does not drift
/// the schedule; a poll that is several periods late reports all missed ticks.
#[derive(Debug, Clone, Default)]
pub struct SecondTicker {
    next_due_ms: Option<f64>,
}

impl SecondTicker {
    pub const PERIOD_MS: f64 = 1000.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now_ms: f64) {
        self.next_due_ms = Some(now_ms + Self::PERIOD_MS);
    }

    pub fn stop(&mut self) {
        self.next_due_ms = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due_ms.is_some()
    }

    /// Number of ticks that fell due up to `now_ms`
    pub fn due_ticks(&mut self, now_ms: f64) -> u32 {
        let Some(mut next) = self.next_due_ms else {
            return 0;
        };
        let mut ticks = 0;
        while now_ms + INTERVAL_TOLERANCE_MS >= next {
            ticks += 1;
            next += Self::PERIOD_MS;
        }
        self.next_due_ms = Some(next);
        ticks
    }
}
