//! Skin-pixel ROI extraction
//!
//! Reduces a frame to one scalar: the mean green value of skin-like pixels
//! inside a fixed rectangle placed where a face usually sits (horizontally
//! centred, shifted up). No face detection is performed; the rectangle and
//! the colour rule are cheap stand-ins for it.

use super::image_ops::Frame;
use crate::config::{RoiConfig, SkinThresholds};

/// Pixel rectangle [x, y, width, height]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoiRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl RoiRect {
    /// Resolve fractional ROI bounds against concrete frame dimensions.
    ///
    /// Each bound is floored, then the rectangle is clipped to the frame.
    pub fn from_fractions(frame_width: u32, frame_height: u32, roi: &RoiConfig) -> Self {
        let fw = f64::from(frame_width);
        let fh = f64::from(frame_height);
        let x = ((fw * roi.x_fraction).floor() as u32).min(frame_width);
        let y = ((fh * roi.y_fraction).floor() as u32).min(frame_height);
        let width = ((fw * roi.width_fraction).floor() as u32).min(frame_width - x);
        let height = ((fh * roi.height_fraction).floor() as u32).min(frame_height - y);
        Self { x, y, width, height }
    }

    /// Number of pixels covered
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Colour rule for skin-like pixels:
/// `r > red_min && g > green_min && b > blue_min && r > b && (r - g) < max_red_green_gap`
#[inline]
pub fn is_skin_pixel(rgb: [u8; 3], thresholds: &SkinThresholds) -> bool {
    let [r, g, b] = rgb;
    r > thresholds.red_min
        && g > thresholds.green_min
        && b > thresholds.blue_min
        && r > b
        && (i16::from(r) - i16::from(g)) < thresholds.max_red_green_gap
}

/// Result of scanning one ROI
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinSample {
    /// Mean green of skin-like pixels, 0.0 when none matched
    pub mean_green: f64,
    /// Skin-like pixel count
    pub skin_pixels: u64,
    /// Total pixels scanned
    pub roi_pixels: u64,
}

impl SkinSample {
    /// Fraction of the ROI classified as skin (0-1)
    pub fn coverage(&self) -> f64 {
        if self.roi_pixels == 0 {
            return 0.0;
        }
        self.skin_pixels as f64 / self.roi_pixels as f64
    }

    /// Whether this frame carries usable signal
    pub fn is_usable(&self) -> bool {
        self.skin_pixels > 0
    }
}

/// Region extractor: ROI placement plus skin classification
#[derive(Debug, Clone)]
pub struct RegionExtractor {
    roi: RoiConfig,
}

impl RegionExtractor {
    pub fn new(roi: RoiConfig) -> Self {
        Self { roi }
    }

    /// ROI rectangle for a frame of the given size
    pub fn roi_for(&self, frame_width: u32, frame_height: u32) -> RoiRect {
        RoiRect::from_fractions(frame_width, frame_height, &self.roi)
    }

    /// Scan the ROI and accumulate green over skin-like pixels
    pub fn scan(&self, frame: &Frame) -> SkinSample {
        let rect = self.roi_for(frame.width(), frame.height());
        let thresholds = &self.roi.skin;

        let mut green_sum = 0u64;
        let mut skin_pixels = 0u64;

        for row in rect.y..rect.y + rect.height {
            for px in frame.row_pixels(row, rect.x, rect.x + rect.width) {
                if is_skin_pixel(px, thresholds) {
                    green_sum += u64::from(px[1]);
                    skin_pixels += 1;
                }
            }
        }

        let mean_green = if skin_pixels > 0 {
            green_sum as f64 / skin_pixels as f64
        } else {
            0.0
        };

        SkinSample {
            mean_green,
            skin_pixels,
            roi_pixels: rect.area(),
        }
    }

    /// Mean green intensity of skin-like ROI pixels, or `0.0` if none
    /// qualified. Callers treat `0.0` as "no usable signal this frame".
    pub fn extract(&self, frame: &Frame) -> f64 {
        self.scan(frame).mean_green
    }
}

impl Default for RegionExtractor {
    fn default() -> Self {
        Self::new(RoiConfig::default())
    }
}
