use fountain_core::{FrequencyScale, SpectrumBinner, SpectrumConfig, SpectrumLevels, MAX_LEVEL};
use proptest::prelude::*;

fn scale_strategy() -> impl Strategy<Value = FrequencyScale> {
    prop_oneof![Just(FrequencyScale::Linear), Just(FrequencyScale::Logarithmic)]
}

#[test]
fn test_levels_follow_input_loudness() {
    let binner = SpectrumBinner::new(SpectrumConfig::default());
    let mut levels = SpectrumLevels::default();

    let mut last = -1.0;
    for magnitude in [1.0, 10.0, 100.0, 1000.0, 10000.0] {
        binner.process(&vec![magnitude; 2048], 48000.0, &mut levels);
        let level = levels.level(0);
        assert!(level > last);
        last = level;
    }
}

#[test]
fn test_bar_count_change_resizes_both_frames() {
    let mut binner = SpectrumBinner::new(SpectrumConfig::default());
    let mut levels = SpectrumLevels::default();
    binner.process(&vec![100.0; 1024], 44100.0, &mut levels);

    binner.set_config(SpectrumConfig {
        bars: 30,
        ..Default::default()
    });
    binner.process(&vec![100.0; 1024], 44100.0, &mut levels);
    assert_eq!(levels.current().len(), 30);
    assert_eq!(levels.previous().len(), 30);
}

#[test]
fn test_more_bars_than_bins() {
    let binner = SpectrumBinner::new(SpectrumConfig {
        bars: 200,
        ..Default::default()
    });
    let mut levels = SpectrumLevels::default();
    binner.process(&vec![10.0; 64], 44100.0, &mut levels);
    assert_eq!(levels.len(), 200);
    assert!(levels.current().iter().all(|l| (l - 10.0).abs() < 1e-3));
}

#[test]
fn test_reset_previous() {
    let binner = SpectrumBinner::new(SpectrumConfig::default());
    let mut levels = SpectrumLevels::default();
    binner.process(&vec![1000.0; 1024], 44100.0, &mut levels);
    binner.process(&vec![1000.0; 1024], 44100.0, &mut levels);
    assert_eq!(levels.delta(0), 0.0);

    levels.reset_previous();
    assert!((levels.delta(0) - 30.0).abs() < 1e-3);
}

proptest! {
    #[test]
    fn prop_flat_spectrum_is_independent_of_layout(
        bars in 1usize..64,
        scale in scale_strategy(),
        exponent in -3.0f32..12.0,
        len in 8usize..4096,
    ) {
        let magnitude = 10f32.powf(exponent);
        let binner = SpectrumBinner::new(SpectrumConfig {
            bars,
            scale,
            ..Default::default()
        });
        let mut levels = SpectrumLevels::default();
        binner.process(&vec![magnitude; len], 44100.0, &mut levels);

        let expected = (10.0 * magnitude.log10()).clamp(0.0, MAX_LEVEL);
        prop_assert_eq!(levels.len(), bars);
        for level in levels.current() {
            prop_assert!((level - expected).abs() < 1e-2, "{} vs {}", level, expected);
        }
    }

    #[test]
    fn prop_levels_stay_in_user_range(
        data in prop::collection::vec(any::<f32>(), 0..512),
        sample_rate in prop_oneof![Just(-1.0f32), Just(0.0f32), 8000.0f32..96000.0],
        min_level in 0.0f32..48.0,
        span in 0.0f32..48.0,
    ) {
        let max_level = min_level + span;
        let binner = SpectrumBinner::new(SpectrumConfig {
            bars: 16,
            min_level,
            max_level,
            ..Default::default()
        });
        let mut levels = SpectrumLevels::default();
        binner.process(&data, sample_rate, &mut levels);

        prop_assert_eq!(levels.len(), 16);
        for level in levels.current() {
            prop_assert!(level.is_finite());
            prop_assert!(*level >= min_level && *level <= max_level);
        }
    }
}
