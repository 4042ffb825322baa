//! Frame source abstraction and a synthetic camera
//!
//! A frame source is anything that can be opened, polled for the newest
//! frame, and closed: a webcam binding, a decoded video, a mobile camera
//! bridge. The monitor owns exactly one source and guarantees `close()` on
//! every exit path.

use std::f64::consts::PI;

use super::image_ops::{Frame, PixelLayout};
use crate::clock::Clock;
use crate::config::CameraConfig;
use crate::error::{Result, RppgError};

/// Pluggable camera interface
pub trait FrameSource {
    /// Acquire the device. Fails with [`RppgError::SourceUnavailable`] when
    /// the camera is missing or permission is denied.
    fn open(&mut self, prefs: &CameraConfig) -> Result<()>;

    /// Newest frame, or `None` if the source is closed, still warming up,
    /// or has nothing new since the last poll.
    fn poll_frame(&mut self) -> Option<Frame>;

    /// Release the device. Must be idempotent.
    fn close(&mut self);

    fn is_open(&self) -> bool;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn open(&mut self, prefs: &CameraConfig) -> Result<()> {
        (**self).open(prefs)
    }

    fn poll_frame(&mut self) -> Option<Frame> {
        (**self).poll_frame()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}

/// Scene rendered by [`SyntheticCamera`]
#[derive(Debug, Clone)]
pub struct SyntheticScene {
    /// Simulated pulse rate (BPM)
    pub heart_rate_bpm: f64,
    /// Mean green level of the face patch
    pub base_green: f64,
    /// Pulse amplitude in green levels
    pub amplitude: f64,
    /// Slow illumination drift (green levels per second)
    pub drift_per_sec: f64,
    /// Cover the face with non-skin pixels
    pub occluded: bool,
    /// Polls that return nothing after opening, like an uninitialised video element
    pub warmup_polls: u32,
    /// Make `open()` fail with this reason
    pub deny_access: Option<String>,
    /// Device frame rate; `None` uses the camera preference passed to `open()`
    pub frame_rate: Option<f64>,
    pub layout: PixelLayout,
}

impl Default for SyntheticScene {
    fn default() -> Self {
        Self {
            heart_rate_bpm: 72.0,
            base_green: 120.0,
            amplitude: 4.0,
            drift_per_sec: 0.0,
            occluded: false,
            warmup_polls: 0,
            deny_access: None,
            frame_rate: None,
            layout: PixelLayout::Rgba8,
        }
    }
}

/// Camera that paints a pulsing skin patch on a dark background.
///
/// Frame timing follows the supplied clock; use a shared
/// [`ManualClock`](crate::clock::ManualClock) to run faster than real time.
pub struct SyntheticCamera<C: Clock> {
    clock: C,
    scene: SyntheticScene,
    width: u32,
    height: u32,
    frame_interval_ms: f64,
    open: bool,
    warmup_left: u32,
    last_frame_ms: Option<f64>,
    started_ms: f64,
    opens: u32,
    closes: u32,
}

impl<C: Clock> SyntheticCamera<C> {
    pub fn new(clock: C, scene: SyntheticScene) -> Self {
        Self {
            clock,
            scene,
            width: 0,
            height: 0,
            frame_interval_ms: 1000.0 / 30.0,
            open: false,
            warmup_left: 0,
            last_frame_ms: None,
            started_ms: 0.0,
            opens: 0,
            closes: 0,
        }
    }

    pub fn scene(&self) -> &SyntheticScene {
        &self.scene
    }

    /// Change the scene while running (e.g. occlude mid-session)
    pub fn scene_mut(&mut self) -> &mut SyntheticScene {
        &mut self.scene
    }

    /// Successful `open()` calls so far
    pub fn open_count(&self) -> u32 {
        self.opens
    }

    /// `close()` calls that actually released the device
    pub fn close_count(&self) -> u32 {
        self.closes
    }

    /// Green level of the face patch at `t_ms` after opening
    pub fn green_at(&self, t_ms: f64) -> f64 {
        let t = t_ms / 1000.0;
        let freq_hz = self.scene.heart_rate_bpm / 60.0;
        self.scene.base_green
            + self.scene.amplitude * (2.0 * PI * freq_hz * t).sin()
            + self.scene.drift_per_sec * t
    }

    fn render(&self, now_ms: f64) -> Option<Frame> {
        let background = [25, 25, 35];
        let mut frame = Frame::solid(self.width, self.height, background, self.scene.layout).ok()?;

        // Face patch is larger than the default ROI so the ROI sits fully inside it
        let fx = self.width / 4;
        let fy = self.height * 3 / 20;
        let fw = self.width / 2;
        let fh = self.height / 2;

        let face = if self.scene.occluded {
            [15, 15, 15]
        } else {
            let green = self.green_at(now_ms - self.started_ms).round().clamp(41.0, 255.0) as u8;
            [185, green, 95]
        };
        frame.fill_rect(fx, fy, fw, fh, face);
        Some(frame)
    }
}

impl<C: Clock> FrameSource for SyntheticCamera<C> {
    fn open(&mut self, prefs: &CameraConfig) -> Result<()> {
        if let Some(reason) = &self.scene.deny_access {
            return Err(RppgError::SourceUnavailable(reason.clone()));
        }
        if self.open {
            return Ok(());
        }
        let rate = self
            .scene
            .frame_rate
            .unwrap_or_else(|| f64::from(prefs.ideal_frame_rate));
        self.frame_interval_ms = 1000.0 / rate.max(1.0);
        self.width = prefs.ideal_width;
        self.height = prefs.ideal_height;
        self.open = true;
        self.warmup_left = self.scene.warmup_polls;
        self.last_frame_ms = None;
        self.started_ms = self.clock.now_ms();
        self.opens += 1;
        Ok(())
    }

    fn poll_frame(&mut self) -> Option<Frame> {
        if !self.open {
            return None;
        }
        if self.warmup_left > 0 {
            self.warmup_left -= 1;
            return None;
        }

        let now = self.clock.now_ms();
        if let Some(last) = self.last_frame_ms {
            if now - last + 1e-6 < self.frame_interval_ms {
                return None;
            }
        }
        self.last_frame_ms = Some(now);
        self.render(now)
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.closes += 1;
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
