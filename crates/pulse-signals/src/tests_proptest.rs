//! Property-based checks for buffer, estimator and session invariants

use proptest::prelude::*;

use crate::config::{EstimationConfig, SkinThresholds};
use crate::rppg::{Estimate, HeartRateEstimator, SampleWindow};
use crate::session::{MeasurementSession, SessionOutcome};
use crate::vision::{is_skin_pixel, RegionExtractor};

proptest! {
    #[test]
    fn test_window_never_exceeds_capacity(
        capacity in 1usize..64,
        extra in 0usize..64,
    ) {
        let mut w = SampleWindow::new(capacity);
        let total = capacity + extra;
        for i in 0..total {
            w.push(i as f64, i as f64);
            prop_assert!(w.len() <= capacity);
        }
        // FIFO: the first `extra` samples are gone
        let first = w.first().map(|s| s.intensity);
        prop_assert_eq!(first, Some(extra as f64));
        prop_assert_eq!(w.intensities().len(), w.timestamps().len());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_short_windows_never_report_bpm(
        values in prop::collection::vec(41.0f64..255.0, 0..64),
    ) {
        let est = HeartRateEstimator::default();
        let mut w = SampleWindow::new(300);
        for (i, v) in values.iter().enumerate() {
            w.push(*v, i as f64 * 33.3);
        }
        prop_assert_eq!(est.estimate(&w), Estimate::unavailable());
    }

    #[test]
    fn test_heart_rate_always_within_bounds(
        values in prop::collection::vec(41.0f64..255.0, 64..300),
        min_hr in 30u32..90,
        span in 1u32..120,
        frame_ms in 5.0f64..100.0,
    ) {
        let config = EstimationConfig {
            min_heart_rate: min_hr,
            max_heart_rate: min_hr + span,
            ..EstimationConfig::default()
        };
        let est = HeartRateEstimator::new(&config);
        let mut w = SampleWindow::new(values.len());
        for (i, v) in values.iter().enumerate() {
            w.push(*v, i as f64 * frame_ms);
        }
        let e = est.estimate(&w);
        let bpm = e.heart_rate_bpm.expect("64+ samples over a positive span");
        prop_assert!(bpm >= min_hr && bpm <= min_hr + span);
        prop_assert!((0.0..=100.0).contains(&e.quality_percent));
    }

    #[test]
    fn test_final_bpm_is_rounded_mean(
        readings in prop::collection::vec(40u32..=180, 1..40),
    ) {
        let mut s = MeasurementSession::with_duration(1);
        s.start().unwrap();
        for bpm in &readings {
            s.record(*bpm);
        }
        let mean = readings.iter().sum::<u32>() as f64 / readings.len() as f64;
        prop_assert_eq!(s.tick(), Some(SessionOutcome::Measured(mean.round() as u32)));
    }

    #[test]
    fn test_skin_rule_matches_definition(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
        let expected = r > 60 && g > 40 && b > 20 && r > b && (r as i32 - g as i32) < 100;
        prop_assert_eq!(is_skin_pixel([r, g, b], &SkinThresholds::default()), expected);
    }

    #[test]
    fn test_roi_always_inside_frame(width in 1u32..2000, height in 1u32..2000) {
        let rect = RegionExtractor::default().roi_for(width, height);
        prop_assert!(rect.x + rect.width <= width);
        prop_assert!(rect.y + rect.height <= height);
    }
}
