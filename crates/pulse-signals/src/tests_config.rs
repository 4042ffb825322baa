use crate::config::*;
use std::env;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Tests touching PULSE_* variables share process environment
static ENV_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn test_default_config_valid() {
    let config = RppgConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.max_samples(), 300);
    assert_eq!(config.min_analysis_samples(), 90);
    assert!((config.frame_interval_ms() - 1000.0 / 30.0).abs() < 1e-12);
}

#[test]
fn test_config_validation_sampling() {
    let mut config = RppgConfig::default();
    config.sampling.sample_rate = 0;
    assert!(config.validate().is_err());

    let mut config = RppgConfig::default();
    config.sampling.min_analysis_seconds = 11;
    assert!(config.validate().is_err());

    let mut config = RppgConfig::default();
    config.sampling.window_seconds = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_estimation() {
    let mut config = RppgConfig::default();
    config.estimation.min_heart_rate = 180;
    assert!(config.validate().is_err());

    let mut config = RppgConfig::default();
    config.estimation.quality_scale = 0.0;
    assert!(config.validate().is_err());

    config.estimation.quality_scale = f64::NAN;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_roi() {
    let mut config = RppgConfig::default();
    config.roi.x_fraction = 0.7;
    assert!(config.validate().is_err(), "roi spills past the right edge");

    let mut config = RppgConfig::default();
    config.roi.height_fraction = 0.0;
    assert!(config.validate().is_err());

    let mut config = RppgConfig::default();
    config.roi.skin.max_red_green_gap = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_session() {
    let mut config = RppgConfig::default();
    config.session.duration_seconds = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_to_toml_string() {
    let toml_str = RppgConfig::default().to_toml_string().unwrap();
    assert!(toml_str.contains("[sampling]"));
    assert!(toml_str.contains("[roi.skin]"));
    assert!(toml_str.contains("facing_mode = \"user\""));
    assert!(toml_str.contains("quality_scale"));
}

#[test]
fn test_config_from_partial_toml() {
    let toml_str = r#"
        [sampling]
        sample_rate = 25

        [estimation]
        max_heart_rate = 200

        [camera]
        facing_mode = "environment"
    "#;

    let config: RppgConfig = toml::from_str(toml_str).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.sampling.sample_rate, 25);
    assert_eq!(config.sampling.window_seconds, 10);
    assert_eq!(config.estimation.max_heart_rate, 200);
    assert_eq!(config.estimation.min_heart_rate, 40);
    assert_eq!(config.camera.facing_mode, FacingMode::Environment);
    assert_eq!(config.session.duration_seconds, 30);
}

#[test]
fn test_config_save_and_load() {
    let mut config = RppgConfig::default();
    config.session.duration_seconds = 45;
    config.roi.skin.red_min = 70;

    let temp_file = NamedTempFile::new().unwrap();
    config.save_to_file(temp_file.path()).unwrap();
    let loaded = RppgConfig::from_file(temp_file.path()).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_from_file_rejects_invalid_values() {
    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), "[session]\nduration_seconds = 0\n").unwrap();
    assert!(matches!(
        RppgConfig::from_file(temp_file.path()),
        Err(ConfigError::Validation(_))
    ));

    std::fs::write(temp_file.path(), "[session\n").unwrap();
    assert!(matches!(
        RppgConfig::from_file(temp_file.path()),
        Err(ConfigError::TomlParse(_))
    ));
}

#[test]
fn test_config_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    env::set_var("PULSE_SAMPLING_SAMPLE_RATE", "25");
    env::set_var("PULSE_ESTIMATION_QUALITY_SCALE", "12.5");
    env::set_var("PULSE_SESSION_DURATION_SECONDS", " 20 ");

    let mut config = RppgConfig::default();
    let result = config.apply_env_overrides();

    env::remove_var("PULSE_SAMPLING_SAMPLE_RATE");
    env::remove_var("PULSE_ESTIMATION_QUALITY_SCALE");
    env::remove_var("PULSE_SESSION_DURATION_SECONDS");

    result.unwrap();
    assert_eq!(config.sampling.sample_rate, 25);
    assert_eq!(config.estimation.quality_scale, 12.5);
    assert_eq!(config.session.duration_seconds, 20);
}

#[test]
fn test_invalid_env_var_handling() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    env::set_var("PULSE_ESTIMATION_MIN_HEART_RATE", "fast");

    let mut config = RppgConfig::default();
    let result = config.apply_env_overrides();

    env::remove_var("PULSE_ESTIMATION_MIN_HEART_RATE");
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[test]
fn test_config_layered_loading() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let default_file = NamedTempFile::new().unwrap();
    let user_file = NamedTempFile::new().unwrap();

    RppgConfig::default().save_to_file(default_file.path()).unwrap();

    let mut user_config = RppgConfig::default();
    user_config.sampling.window_seconds = 8;
    user_config.estimation.min_heart_rate = 45;
    user_config.save_to_file(user_file.path()).unwrap();

    env::set_var("PULSE_SESSION_DURATION_SECONDS", "15");
    let loaded = RppgConfig::load_layered(Some(default_file.path()), Some(user_file.path()));
    env::remove_var("PULSE_SESSION_DURATION_SECONDS");

    let loaded = loaded.unwrap();
    assert_eq!(loaded.sampling.window_seconds, 8);
    assert_eq!(loaded.estimation.min_heart_rate, 45);
    assert_eq!(loaded.session.duration_seconds, 15);
}

#[test]
fn test_layered_loading_skips_missing_files() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let loaded = RppgConfig::load_layered(Some(&missing), None).unwrap();
    assert_eq!(loaded, RppgConfig::default());
}

#[test]
fn test_env_overrides_revalidated() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let file = NamedTempFile::new().unwrap();
    RppgConfig::default().save_to_file(file.path()).unwrap();

    env::set_var("PULSE_ESTIMATION_MAX_HEART_RATE", "30");
    let result = RppgConfig::from_file_with_env(file.path());
    env::remove_var("PULSE_ESTIMATION_MAX_HEART_RATE");

    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[test]
fn test_layered_loading_merges_sections_from_each_file() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let default_file = NamedTempFile::new().unwrap();
    let user_file = NamedTempFile::new().unwrap();
    std::fs::write(
        default_file.path(),
        "[estimation]\nmin_heart_rate = 50\n\n[sampling]\nsample_rate = 25\nwindow_seconds = 12\n",
    )
    .unwrap();
    std::fs::write(
        user_file.path(),
        "[session]\nduration_seconds = 12\n\n[sampling]\nwindow_seconds = 8\n",
    )
    .unwrap();

    let loaded =
        RppgConfig::load_layered(Some(default_file.path()), Some(user_file.path())).unwrap();

    // Default file survives where the user file is silent
    assert_eq!(loaded.estimation.min_heart_rate, 50);
    assert_eq!(loaded.sampling.sample_rate, 25);
    // User file wins per key, not per section
    assert_eq!(loaded.sampling.window_seconds, 8);
    assert_eq!(loaded.session.duration_seconds, 12);
    // Neither file sets these
    assert_eq!(loaded.estimation.max_heart_rate, 180);
    assert_eq!(loaded.roi, RoiConfig::default());
}

#[test]
fn test_layered_loading_validates_merged_result() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let default_file = NamedTempFile::new().unwrap();
    let user_file = NamedTempFile::new().unwrap();
    std::fs::write(default_file.path(), "[estimation]\nmax_heart_rate = 100\n").unwrap();
    std::fs::write(user_file.path(), "[estimation]\nmin_heart_rate = 120\n").unwrap();

    assert!(matches!(
        RppgConfig::load_layered(Some(default_file.path()), Some(user_file.path())),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn test_window_length_is_bounded() {
    let mut config = RppgConfig::default();
    config.sampling.sample_rate = 240;
    config.sampling.window_seconds = 20_000_000;
    assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    // Helpers stay total even on an unvalidated config
    assert_eq!(config.max_samples(), 240usize.saturating_mul(20_000_000));

    config.sampling.window_seconds = MAX_WINDOW_SECONDS;
    assert!(config.validate().is_ok());
    assert_eq!(config.max_samples(), 240 * MAX_WINDOW_SECONDS as usize);

    config.sampling.window_seconds = MAX_WINDOW_SECONDS + 1;
    assert!(config.validate().is_err());
}
