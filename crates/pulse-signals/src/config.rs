use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Absolute floor below which the frequency estimator refuses to run.
pub const MIN_ESTIMATION_SAMPLES: usize = 64;

/// Longest accepted analysis window. Bounds the window allocation
/// (`sample_rate × window_seconds`).
pub const MAX_WINDOW_SECONDS: u32 = 600;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Complete configuration for one measurement session.
///
/// Immutable once a session has started; the monitor clones it at
/// construction time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RppgConfig {
    pub sampling: SamplingConfig,
    pub estimation: EstimationConfig,
    pub session: SessionConfig,
    pub roi: RoiConfig,
    pub camera: CameraConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SamplingConfig {
    /// Frames per second admitted into the pipeline
    pub sample_rate: u32,
    /// Length of the analysis window (seconds)
    pub window_seconds: u32,
    /// Window fill required before estimates are produced (seconds)
    pub min_analysis_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EstimationConfig {
    /// Lower clamp bound for reported heart rate (BPM)
    pub min_heart_rate: u32,
    /// Upper clamp bound for reported heart rate (BPM)
    pub max_heart_rate: u32,
    /// Multiplier applied to the detrended standard deviation to obtain
    /// the quality percentage. Heuristic; tune per camera.
    pub quality_scale: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Countdown length of a measurement (seconds)
    pub duration_seconds: u32,
}

/// Region of interest as fractions of the frame, plus the skin classifier
/// thresholds applied inside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RoiConfig {
    pub x_fraction: f64,
    pub y_fraction: f64,
    pub width_fraction: f64,
    pub height_fraction: f64,
    pub skin: SkinThresholds,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SkinThresholds {
    pub red_min: u8,
    pub green_min: u8,
    pub blue_min: u8,
    /// Exclusive upper bound on `red - green`
    pub max_red_green_gap: i16,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    User,
    Environment,
}

impl Default for FacingMode {
    fn default() -> Self {
        Self::User
    }
}

/// Capture preferences handed to frame sources. Advisory only; a source
/// may deliver any resolution and rate it can.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub facing_mode: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub ideal_frame_rate: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_rate: 30,
            window_seconds: 10,
            min_analysis_seconds: 3,
        }
    }
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            min_heart_rate: 40,
            max_heart_rate: 180,
            quality_scale: 10.0,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 30,
        }
    }
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            x_fraction: 0.3,
            y_fraction: 0.2,
            width_fraction: 0.4,
            height_fraction: 0.4,
            skin: SkinThresholds::default(),
        }
    }
}

impl Default for SkinThresholds {
    fn default() -> Self {
        Self {
            red_min: 60,
            green_min: 40,
            blue_min: 20,
            max_red_green_gap: 100,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::User,
            ideal_width: 640,
            ideal_height: 480,
            ideal_frame_rate: 30,
        }
    }
}

impl RppgConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: RppgConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    /// Variables are prefixed with `PULSE_`, e.g. `PULSE_SAMPLING_SAMPLE_RATE=25`.
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. User config file (if exists)
    /// 3. Default config file
    /// 4. Built-in defaults (lowest priority)
    pub fn load_layered(
        default_path: Option<&Path>,
        user_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut layered = toml::Table::new();

        for path in [default_path, user_path].into_iter().flatten() {
            if path.exists() {
                let layer: toml::Table = toml::from_str(&fs::read_to_string(path)?)?;
                merge_tables(&mut layered, layer);
            }
        }

        let mut config: RppgConfig = toml::Value::Table(layered).try_into()?;
        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub(crate) fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        override_from_env("PULSE_SAMPLING_SAMPLE_RATE", &mut self.sampling.sample_rate)?;
        override_from_env(
            "PULSE_SAMPLING_WINDOW_SECONDS",
            &mut self.sampling.window_seconds,
        )?;
        override_from_env(
            "PULSE_SAMPLING_MIN_ANALYSIS_SECONDS",
            &mut self.sampling.min_analysis_seconds,
        )?;

        override_from_env(
            "PULSE_ESTIMATION_MIN_HEART_RATE",
            &mut self.estimation.min_heart_rate,
        )?;
        override_from_env(
            "PULSE_ESTIMATION_MAX_HEART_RATE",
            &mut self.estimation.max_heart_rate,
        )?;
        override_from_env(
            "PULSE_ESTIMATION_QUALITY_SCALE",
            &mut self.estimation.quality_scale,
        )?;

        override_from_env(
            "PULSE_SESSION_DURATION_SECONDS",
            &mut self.session.duration_seconds,
        )?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling.sample_rate == 0 || self.sampling.sample_rate > 240 {
            return Err(ConfigError::Validation(
                "sampling.sample_rate must be in [1, 240]".to_string(),
            ));
        }
        if self.sampling.window_seconds == 0 || self.sampling.window_seconds > MAX_WINDOW_SECONDS {
            return Err(ConfigError::Validation(format!(
                "sampling.window_seconds must be in [1, {MAX_WINDOW_SECONDS}]"
            )));
        }
        if self.sampling.min_analysis_seconds == 0
            || self.sampling.min_analysis_seconds > self.sampling.window_seconds
        {
            return Err(ConfigError::Validation(
                "sampling.min_analysis_seconds must be in [1, window_seconds]".to_string(),
            ));
        }

        if self.estimation.min_heart_rate == 0
            || self.estimation.min_heart_rate >= self.estimation.max_heart_rate
        {
            return Err(ConfigError::Validation(
                "estimation.min_heart_rate must be in [1, max_heart_rate)".to_string(),
            ));
        }
        if !(self.estimation.quality_scale > 0.0 && self.estimation.quality_scale.is_finite()) {
            return Err(ConfigError::Validation(
                "estimation.quality_scale must be a positive finite number".to_string(),
            ));
        }

        if self.session.duration_seconds == 0 {
            return Err(ConfigError::Validation(
                "session.duration_seconds must be >= 1".to_string(),
            ));
        }

        let roi = &self.roi;
        let fractions = [
            ("roi.x_fraction", roi.x_fraction),
            ("roi.y_fraction", roi.y_fraction),
            ("roi.width_fraction", roi.width_fraction),
            ("roi.height_fraction", roi.height_fraction),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!("{name} must be in [0, 1]")));
            }
        }
        if roi.width_fraction <= 0.0 || roi.height_fraction <= 0.0 {
            return Err(ConfigError::Validation(
                "roi width and height fractions must be > 0".to_string(),
            ));
        }
        if roi.x_fraction + roi.width_fraction > 1.0 || roi.y_fraction + roi.height_fraction > 1.0
        {
            return Err(ConfigError::Validation(
                "roi must lie inside the frame".to_string(),
            ));
        }
        if roi.skin.max_red_green_gap <= 0 {
            return Err(ConfigError::Validation(
                "roi.skin.max_red_green_gap must be > 0".to_string(),
            ));
        }

        if self.camera.ideal_width == 0
            || self.camera.ideal_height == 0
            || self.camera.ideal_frame_rate == 0
        {
            return Err(ConfigError::Validation(
                "camera preferences must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Capacity of the sliding window: `sample_rate × window_seconds`.
    pub fn max_samples(&self) -> usize {
        samples_for(self.sampling.sample_rate, self.sampling.window_seconds)
    }

    /// Window fill required before estimating: `sample_rate × min_analysis_seconds`.
    pub fn min_analysis_samples(&self) -> usize {
        samples_for(self.sampling.sample_rate, self.sampling.min_analysis_seconds)
    }

    /// Minimum spacing between admitted frames (ms).
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / f64::from(self.sampling.sample_rate.max(1))
    }

    /// Export configuration to TOML string
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = self
            .to_toml_string()
            .map_err(|e| ConfigError::Validation(format!("TOML serialization error: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }
}

fn override_from_env<T: std::str::FromStr>(key: &str, slot: &mut T) -> Result<(), ConfigError> {
    if let Ok(val) = std::env::var(key) {
        *slot = val
            .trim()
            .parse()
            .map_err(|_| ConfigError::Validation(format!("Invalid {key}")))?;
    }
    Ok(())
}

/// `rate × seconds` in `usize`, saturating on configs that skipped `validate()`
fn samples_for(rate: u32, seconds: u32) -> usize {
    (rate as usize).saturating_mul(seconds as usize)
}

/// Recursively overlay `overlay` onto `base`; tables merge key by key,
/// any other value replaces the existing one.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(overlay_table) => {
                if let Some(toml::Value::Table(base_table)) = base.get_mut(&key) {
                    merge_tables(base_table, overlay_table);
                    continue;
                }
                base.insert(key, toml::Value::Table(overlay_table));
            }
            other => {
                base.insert(key, other);
            }
        }
    }
}
