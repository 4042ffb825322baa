//! Camera frame container
//!
//! Frames arrive from the frame source as packed 8-bit RGB or RGBA rows.
//! Dimensions are validated once at construction so downstream stages can
//! index the pixel buffer without further checks.

use crate::error::{Result, RppgError};

/// Channel layout of a packed pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// 3 bytes per pixel: R, G, B
    Rgb8,
    /// 4 bytes per pixel: R, G, B, A (alpha ignored)
    Rgba8,
}

impl PixelLayout {
    /// Bytes per pixel
    #[inline]
    pub fn channels(self) -> u8 {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }

    pub fn from_channels(channels: u8) -> Result<Self> {
        match channels {
            3 => Ok(Self::Rgb8),
            4 => Ok(Self::Rgba8),
            other => Err(RppgError::UnsupportedLayout(other)),
        }
    }
}

/// One validated camera frame
#[derive(Debug, Clone)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    layout: PixelLayout,
}

impl Frame {
    /// Wrap a packed pixel buffer.
    ///
    /// Rejects zero dimensions and buffers whose length does not match
    /// `width * height * channels`.
    pub fn new(data: Vec<u8>, width: u32, height: u32, layout: PixelLayout) -> Result<Self> {
        let expected = byte_len(width, height, layout).unwrap_or(usize::MAX);

        if width == 0 || height == 0 || data.len() != expected {
            return Err(RppgError::InvalidFrame {
                width,
                height,
                channels: layout.channels(),
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
            layout,
        })
    }

    /// Build from a raw buffer with a channel count (3 or 4)
    pub fn from_raw(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Result<Self> {
        Self::new(data, width, height, PixelLayout::from_channels(channels)?)
    }

    /// Frame filled with a single colour
    pub fn solid(width: u32, height: u32, rgb: [u8; 3], layout: PixelLayout) -> Result<Self> {
        let Some(len) = byte_len(width, height, layout) else {
            return Err(RppgError::InvalidFrame {
                width,
                height,
                channels: layout.channels(),
                expected: usize::MAX,
                actual: 0,
            });
        };
        let mut data = Vec::with_capacity(len);
        for _ in 0..len / layout.channels() as usize {
            data.extend_from_slice(&rgb);
            if layout == PixelLayout::Rgba8 {
                data.push(255);
            }
        }
        Self::new(data, width, height, layout)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Raw packed bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get pixel at (x, y) as [R, G, B]
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0];
        }
        let idx = self.offset(x, y);
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Set pixel at (x, y); out-of-bounds writes are ignored
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.offset(x, y);
        self.data[idx..idx + 3].copy_from_slice(&rgb);
    }

    /// Paint a rectangle, clipped to the frame
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, rgb: [u8; 3]) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        for py in y..y_end {
            for px in x..x_end {
                self.set_pixel(px, py, rgb);
            }
        }
    }

    /// Iterate over the pixels of one row segment `[x0, x1)` as [R, G, B]
    pub fn row_pixels(&self, y: u32, x0: u32, x1: u32) -> impl Iterator<Item = [u8; 3]> + '_ {
        let channels = self.layout.channels() as usize;
        let x1 = x1.min(self.width);
        let x0 = x0.min(x1);
        let (start, end) = if y < self.height {
            (self.offset(x0, y), self.offset(x0, y) + (x1 - x0) as usize * channels)
        } else {
            (0, 0)
        };
        self.data[start..end]
            .chunks_exact(channels)
            .map(|px| [px[0], px[1], px[2]])
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.layout.channels() as usize
    }
}

/// Packed buffer length for the given dimensions, `None` on overflow
fn byte_len(width: u32, height: u32, layout: PixelLayout) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(layout.channels() as usize))
}
