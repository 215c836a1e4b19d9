//! Oscillating base color
//!
//! Each HSV component runs an independent triangle wave between its bounds.
//! An audio-driven offset is layered on top when the emitter color is
//! produced, without feeding back into the oscillator.

use crate::color::{ChannelBounds, ColorBounds, HsvColor, HUE_RANGE, UNIT_RANGE};
use crate::spectrum::{SpectrumLevels, MAX_LEVEL};
use serde::{Deserialize, Serialize};

/// Oscillation and audio response of one HSV component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorChannel {
    /// Lower bound
    pub min: f32,
    /// Upper bound
    pub max: f32,
    /// Step applied per audio update
    pub shift_rate: f32,
    /// Strength of the audio offset at full level
    pub modifier: f32,
    /// Per-particle scatter
    pub variation: f32,
    /// Spectrum band (1-based) driving the offset
    pub bar: usize,
}

impl Default for ColorChannel {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            shift_rate: 0.0,
            modifier: 0.0,
            variation: 0.0,
            bar: 1,
        }
    }
}

impl ColorChannel {
    /// Default hue channel: full circle, slow drift, fully audio-driven
    pub fn hue() -> Self {
        Self {
            min: 0.0,
            max: 360.0,
            shift_rate: 0.1,
            modifier: 360.0,
            variation: 45.0,
            bar: 1,
        }
    }

    /// Default saturation channel: pinned at full saturation
    pub fn saturation() -> Self {
        Self {
            min: 1.0,
            max: 1.0,
            ..Default::default()
        }
    }

    /// Default value channel: slow pulse between dim and mid brightness
    pub fn value() -> Self {
        Self {
            min: 0.2,
            max: 0.6,
            shift_rate: 0.0005,
            modifier: 0.0,
            variation: 0.3,
            bar: 1,
        }
    }

    /// Range and scatter as used at emission
    pub fn bounds(&self) -> ChannelBounds {
        ChannelBounds::new(self.min, self.max, self.variation)
    }

    /// Advance `value` one step; on reaching a bound, undo and reverse
    fn oscillate(&self, value: &mut f32, direction: &mut f32) {
        let step = self.shift_rate * *direction;
        *value += step;
        if *value >= self.max || *value <= self.min {
            *value -= step;
            *direction = -*direction;
        }
        *value = value.max(self.min).min(self.max);
    }

    fn audio_offset(&self, levels: &SpectrumLevels) -> f32 {
        if self.modifier == 0.0 || levels.is_empty() {
            return 0.0;
        }
        levels.level(levels.band_index(self.bar)) / MAX_LEVEL * self.modifier
    }
}

/// Per-component oscillator settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorCyclerConfig {
    /// Hue channel
    pub hue: ColorChannel,
    /// Saturation channel
    pub saturation: ColorChannel,
    /// Value channel
    pub value: ColorChannel,
}

impl Default for ColorCyclerConfig {
    fn default() -> Self {
        Self {
            hue: ColorChannel::hue(),
            saturation: ColorChannel::saturation(),
            value: ColorChannel::value(),
        }
    }
}

impl ColorCyclerConfig {
    /// Bounds handed to the emitter for per-particle variance
    pub fn bounds(&self) -> ColorBounds {
        ColorBounds {
            hue: self.hue.bounds(),
            saturation: self.saturation.bounds(),
            value: self.value.bounds(),
        }
    }
}

/// Triangle-wave HSV oscillator
#[derive(Debug, Clone, PartialEq)]
pub struct ColorCycler {
    base: HsvColor,
    directions: [f32; 3],
}

impl Default for ColorCycler {
    fn default() -> Self {
        Self::new(HsvColor::default())
    }
}

impl ColorCycler {
    /// Start oscillating from `initial`, all components rising
    pub fn new(initial: HsvColor) -> Self {
        Self {
            base: initial,
            directions: [1.0; 3],
        }
    }

    /// Restart from `initial`, all components rising
    pub fn reset(&mut self, initial: HsvColor) {
        self.base = initial;
        self.directions = [1.0; 3];
    }

    /// Oscillator state without the audio offset
    pub fn base(&self) -> HsvColor {
        self.base
    }

    /// Advance the oscillators one step and return the emitter color for the
    /// next batch of particles
    pub fn update(&mut self, config: &ColorCyclerConfig, levels: &SpectrumLevels) -> HsvColor {
        let [h_dir, s_dir, v_dir] = &mut self.directions;
        config.hue.oscillate(&mut self.base.h, h_dir);
        config.saturation.oscillate(&mut self.base.s, s_dir);
        config.value.oscillate(&mut self.base.v, v_dir);

        HsvColor {
            h: config
                .hue
                .bounds()
                .wrap_and_clamp(self.base.h + config.hue.audio_offset(levels), HUE_RANGE),
            s: config.saturation.bounds().wrap_and_clamp(
                self.base.s + config.saturation.audio_offset(levels),
                UNIT_RANGE,
            ),
            v: config
                .value
                .bounds()
                .wrap_and_clamp(self.base.v + config.value.audio_offset(levels), UNIT_RANGE),
        }
    }
}
