//! Audio-to-vector modulation
//!
//! [`shift`] turns up to three spectrum bars into a random perturbation of a
//! static vector. It drives the gravity, wind, velocity and position targets
//! of the emitter.

use crate::spectrum::{SpectrumLevels, MAX_LEVEL};
use crate::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Largest modulation strength a config may request, in either direction
pub const MAX_MODIFIER: f32 = 10.0;

/// How a bar is turned into a modulation magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LevelMode {
    /// Frame-to-frame change only
    Difference,
    /// Absolute level only
    Level,
    /// Level plus change, never below 1
    #[default]
    Both,
}

/// How the randomized magnitude is applied to the static vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModificationMode {
    /// `r * modifier * v`
    #[default]
    Linear,
    /// `±(r + 1)^trunc(modifier) * v`
    Exponential,
}

/// Modulation of one emitter vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulationConfig {
    /// Static baseline the modulation perturbs
    pub vector: Vec3,
    /// 1-based spectrum band feeding each axis
    pub bars: [usize; 3],
    /// Use `1 - m` instead of `m`
    pub invert: bool,
    /// Modulation strength in `[-MAX_MODIFIER, MAX_MODIFIER]`; zero disables
    /// modulation
    pub modifier: f32,
    /// Magnitude source
    pub mode: LevelMode,
    /// Combination rule
    pub modification: ModificationMode,
}

impl Default for ModulationConfig {
    fn default() -> Self {
        Self::fixed(Vec3::ZERO)
    }
}

impl ModulationConfig {
    /// Unmodulated config around `vector`
    pub fn fixed(vector: Vec3) -> Self {
        Self {
            vector,
            bars: [1, 1, 1],
            invert: false,
            modifier: 0.0,
            mode: LevelMode::Both,
            modification: ModificationMode::Linear,
        }
    }

    /// True when [`shift`] would return the static vector unchanged
    pub fn is_static(&self) -> bool {
        self.modifier == 0.0
    }

    fn magnitude(&self, levels: &SpectrumLevels, band: usize) -> f32 {
        let bar = levels.band_index(band);
        let current = levels.level(bar);
        let delta = levels.delta(bar);
        let m = match self.mode {
            LevelMode::Difference => delta / MAX_LEVEL,
            LevelMode::Level => current / MAX_LEVEL,
            LevelMode::Both => ((current + delta) / MAX_LEVEL).max(1.0),
        };
        if self.invert {
            1.0 - m
        } else {
            m
        }
    }

    fn combine<R: Rng + ?Sized>(&self, random: f32, axis: f32, rng: &mut R) -> f32 {
        match self.modification {
            ModificationMode::Linear => random * self.modifier * axis,
            ModificationMode::Exponential => {
                // Integer exponent: fractional strength is truncated
                let value = (random + 1.0).powi(self.modifier as i32) * axis;
                if rng.random_bool(0.5) {
                    value
                } else {
                    -value
                }
            }
        }
    }
}

/// Perturb `config.vector` by the spectrum bars the config selects.
///
/// Each axis draws a uniform value in `[-m, m]` where `m` is the magnitude
/// of its bar, so both direction and size vary from call to call. The
/// result is always centred on the static vector. An axis that does not
/// come out finite keeps its static value.
pub fn shift<R: Rng + ?Sized>(
    config: &ModulationConfig,
    levels: &SpectrumLevels,
    rng: &mut R,
) -> Vec3 {
    if config.is_static() {
        return config.vector;
    }

    let mut out = [0.0f32; 3];
    let axes = config.vector.to_array();
    for (axis, slot) in out.iter_mut().enumerate() {
        let m = config.magnitude(levels, config.bars[axis]);
        let random = (rng.random::<f32>() * 2.0 - 1.0) * m;
        let value = config.combine(random, axes[axis], rng) + axes[axis];
        *slot = if value.is_finite() { value } else { axes[axis] };
    }

    Vec3::from_array(out)
}
