//! Vision stage: frames in, one scalar per frame out
//!
//! - `Frame` / `PixelLayout`: validated packed RGB(A) buffers
//! - `RegionExtractor`: fixed face ROI plus skin-colour rule, mean green
//! - `FrameSource`: pluggable camera, with `SyntheticCamera` for
//!   simulation and tests
//!
//! # Example
//!
//! ```
//! use pulse_signals::vision::{Frame, PixelLayout, RegionExtractor};
//!
//! let frame = Frame::solid(64, 48, [180, 120, 90], PixelLayout::Rgba8).unwrap();
//! let green = RegionExtractor::default().extract(&frame);
//! assert_eq!(green, 120.0);
//! ```

mod frame_source;
mod image_ops;
mod skin_roi;

pub use frame_source::{FrameSource, SyntheticCamera, SyntheticScene};
pub use image_ops::{Frame, PixelLayout};
pub use skin_roi::{is_skin_pixel, RegionExtractor, RoiRect, SkinSample};
