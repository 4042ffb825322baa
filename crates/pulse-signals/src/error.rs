//! Error types for the measurement pipeline.

use thiserror::Error;

use crate::config::ConfigError;
use crate::session::SessionState;

#[derive(Error, Debug)]
pub enum RppgError {
    /// The frame source could not be opened (permission denied, no device, ...).
    #[error("frame source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("invalid frame: {width}x{height} with {channels} channels needs {expected} bytes, got {actual}")]
    InvalidFrame {
        width: u32,
        height: u32,
        channels: u8,
        expected: usize,
        actual: usize,
    },

    #[error("unsupported channel count: {0} (expected 3 or 4)")]
    UnsupportedLayout(u8),

    #[error("cannot {command} while session is {from:?}")]
    InvalidTransition {
        from: SessionState,
        command: &'static str,
    },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, RppgError>;
