//! Sliding window of green-intensity samples
//!
//! Fixed-capacity FIFO: pushing past capacity evicts the oldest sample.
//! Intensities and timestamps live in one sequence of [`Sample`] so the two
//! views can never drift out of alignment.

use std::collections::VecDeque;

use ndarray::Array1;

/// One processed frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Mean green of skin pixels
    pub intensity: f64,
    /// Capture time (ms)
    pub timestamp_ms: f64,
}

/// Rolling sample buffer
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl SampleWindow {
    /// Create a window holding at most `capacity` samples (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest if full.
    ///
    /// Returns the evicted sample, if any.
    pub fn push(&mut self, intensity: f64, timestamp_ms: f64) -> Option<Sample> {
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(Sample {
            intensity,
            timestamp_ms,
        });
        evicted
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    /// Fill ratio (0-1)
    pub fn fill_ratio(&self) -> f64 {
        self.samples.len() as f64 / self.capacity as f64
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> + '_ {
        self.samples.iter()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.front()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Intensity sequence, oldest first
    pub fn intensities(&self) -> Array1<f64> {
        self.samples.iter().map(|s| s.intensity).collect()
    }

    /// Timestamp sequence, index-aligned with [`intensities`](Self::intensities)
    pub fn timestamps(&self) -> Array1<f64> {
        self.samples.iter().map(|s| s.timestamp_ms).collect()
    }

    /// Time spanned by the window in seconds (0 with fewer than 2 samples)
    pub fn duration_seconds(&self) -> f64 {
        match (self.samples.front(), self.samples.back()) {
            (Some(first), Some(last)) => (last.timestamp_ms - first.timestamp_ms) / 1000.0,
            _ => 0.0,
        }
    }
}
