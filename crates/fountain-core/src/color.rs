//! HSV color type, RGB conversion, and per-particle color variance

use palette::{FromColor, Hsv, Srgb};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Natural range of the hue component (degrees)
pub const HUE_RANGE: f32 = 360.0;

/// Natural range of the saturation and value components
pub const UNIT_RANGE: f32 = 1.0;

/// Hue in degrees [0, 360), saturation and value in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HsvColor {
    /// Hue (degrees)
    pub h: f32,
    /// Saturation
    pub s: f32,
    /// Value
    pub v: f32,
}

impl Default for HsvColor {
    fn default() -> Self {
        Self::new(0.0, 1.0, 0.6)
    }
}

impl HsvColor {
    /// Create a new color
    pub const fn new(h: f32, s: f32, v: f32) -> Self {
        Self { h, s, v }
    }

    /// Convert to sRGB components in [0, 1]
    pub fn to_rgb(&self) -> [f32; 3] {
        let hsv: Hsv = Hsv::new(self.h, self.s, self.v);
        let rgb: Srgb = Srgb::from_color(hsv);
        [rgb.red, rgb.green, rgb.blue]
    }

    /// Convert to sRGBA with full opacity
    pub fn to_rgba(&self) -> [f32; 4] {
        let [r, g, b] = self.to_rgb();
        [r, g, b, 1.0]
    }

    /// Build from sRGB components in [0, 1]
    pub fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        let rgb: Srgb = Srgb::new(r, g, b);
        let hsv: Hsv = Hsv::from_color(rgb);
        Self {
            h: hsv.hue.into_positive_degrees(),
            s: hsv.saturation,
            v: hsv.value,
        }
    }

    /// Draw a per-particle color scattered around `self` within `bounds`
    pub fn vary<R: Rng + ?Sized>(&self, bounds: &ColorBounds, rng: &mut R) -> Self {
        Self {
            h: bounds.hue.vary(self.h, HUE_RANGE, rng),
            s: bounds.saturation.vary(self.s, UNIT_RANGE, rng),
            v: bounds.value.vary(self.v, UNIT_RANGE, rng),
        }
    }
}

/// Allowed range and per-particle scatter of one HSV component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelBounds {
    /// Lower bound
    pub min: f32,
    /// Upper bound
    pub max: f32,
    /// Per-particle scatter (± around the base)
    pub variation: f32,
}

impl ChannelBounds {
    /// Create bounds
    pub const fn new(min: f32, max: f32, variation: f32) -> Self {
        Self {
            min,
            max,
            variation,
        }
    }

    /// Wrap `value` into `[0, range]` and pin it into `[min, max]`.
    ///
    /// Only values strictly outside the range wrap, so the endpoints 0 and
    /// `range` are kept as they are.
    pub fn wrap_and_clamp(&self, value: f32, range: f32) -> f32 {
        let mut wrapped = value;
        if wrapped > range {
            wrapped -= range * ((wrapped - range) / range).ceil();
        } else if wrapped < 0.0 {
            wrapped += range * (-wrapped / range).ceil();
        }
        wrapped.max(self.min).min(self.max)
    }

    /// Scatter `base` by up to ±variation. Zero variation keeps the base.
    pub fn vary<R: Rng + ?Sized>(&self, base: f32, range: f32, rng: &mut R) -> f32 {
        if self.variation <= 0.0 {
            return base;
        }
        let offset = rng.random_range(-1.0f32..=1.0) * self.variation;
        self.wrap_and_clamp(base + offset, range)
    }
}

/// Component bounds for hue, saturation and value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorBounds {
    /// Hue bounds (degrees)
    pub hue: ChannelBounds,
    /// Saturation bounds
    pub saturation: ChannelBounds,
    /// Value bounds
    pub value: ChannelBounds,
}

impl Default for ColorBounds {
    fn default() -> Self {
        Self {
            hue: ChannelBounds::new(0.0, 360.0, 45.0),
            saturation: ChannelBounds::new(1.0, 1.0, 0.0),
            value: ChannelBounds::new(0.2, 0.6, 0.3),
        }
    }
}
