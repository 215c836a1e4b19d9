//! Particle effect presets and preset rotation

use crate::collision::Plane;
use crate::color::HsvColor;
use crate::color_cycler::ColorCyclerConfig;
use crate::emitter::EmitterParameters;
use crate::modulation::ModulationConfig;
use crate::spectrum::{SpectrumLevels, MAX_LEVEL};
use crate::{CoreError, Result, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Band (1-based) that drives release-count modulation
pub const RELEASE_BAND: usize = 10;

/// One complete particle effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticlePreset {
    /// Display name
    pub name: String,
    /// Drag toward the wind velocity
    pub air_resistance: bool,
    /// Starting base color
    pub color: HsvColor,
    /// Particles released per emission
    pub release_count: usize,
    /// Audio scaling of the release count; zero keeps it fixed
    pub release_count_modifier: f32,
    /// Particle lifespan (seconds)
    pub lifespan: f32,
    /// Minimum time between emissions (seconds)
    pub release_interval: f32,
    /// Particle size
    pub size: f32,
    /// Launch jitter radius
    pub velocity_variance: f32,
    /// Gravity and its modulation
    pub gravity: ModulationConfig,
    /// Wind and its modulation
    pub wind: ModulationConfig,
    /// Launch velocity and its modulation
    pub velocity: ModulationConfig,
    /// Spawn position and its modulation
    pub position: ModulationConfig,
    /// Color oscillators
    pub colors: ColorCyclerConfig,
    /// Rotation speed per frame
    pub rotation_speed: f32,
    /// Bar change (fraction of full scale) that reverses the rotation
    pub rotation_sensitivity: f32,
    /// Band (1-based) watched for rotation reversal
    pub rotation_bar: usize,
    /// Collision planes installed with this preset
    pub planes: Vec<Plane>,
    /// Particle texture, passed through to the renderer
    pub texture: Option<PathBuf>,
}

impl Default for ParticlePreset {
    fn default() -> Self {
        Self {
            name: "Fountain".to_string(),
            air_resistance: true,
            color: HsvColor::new(0.0, 1.0, 0.6),
            release_count: 2,
            release_count_modifier: 0.0,
            lifespan: 3.0,
            release_interval: 0.0,
            size: 0.4,
            velocity_variance: 1.5,
            gravity: ModulationConfig::fixed(Vec3::new(0.0, 0.0, -15.0)),
            wind: ModulationConfig::fixed(Vec3::new(2.0, -2.0, 0.0)),
            velocity: ModulationConfig::fixed(Vec3::new(-4.0, 4.0, 0.0)),
            position: ModulationConfig::fixed(Vec3::ZERO),
            colors: ColorCyclerConfig::default(),
            rotation_speed: 0.1,
            rotation_sensitivity: 0.02,
            rotation_bar: 1,
            planes: Vec::new(),
            texture: None,
        }
    }
}

impl ParticlePreset {
    /// Emitter parameters with every vector at its static value
    pub fn emitter_parameters(&self) -> EmitterParameters {
        EmitterParameters {
            release_count: self.release_count,
            release_interval: self.release_interval,
            lifespan: self.lifespan,
            size: self.size,
            position: self.position.vector,
            velocity: self.velocity.vector,
            gravity: self.gravity.vector,
            wind: self.wind.vector,
            velocity_variance: self.velocity_variance,
            air_resistance: self.air_resistance,
            color: self.color,
            color_bounds: self.colors.bounds(),
        }
    }

    /// Release count for the current spectrum.
    ///
    /// `n = trunc(level / 96 * base)`, then `n + trunc(n * modifier)`,
    /// floored at zero. Without a modifier the base count is returned.
    pub fn release_count_for(&self, levels: &SpectrumLevels) -> usize {
        if self.release_count_modifier == 0.0 {
            return self.release_count;
        }
        let level = levels.level(levels.band_index(RELEASE_BAND));
        let n = (level / MAX_LEVEL * self.release_count as f32).trunc();
        let n = n + (n * self.release_count_modifier).trunc();
        n.max(0.0) as usize
    }
}

/// How the next preset is picked on start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PresetSelection {
    /// In list order, wrapping around
    #[default]
    Cycle,
    /// Any preset except the current one
    Random,
}

/// Preset list with the index of the active preset
#[derive(Debug, Clone)]
pub struct PresetCycle {
    presets: Vec<ParticlePreset>,
    selection: PresetSelection,
    current: Option<usize>,
}

impl PresetCycle {
    /// Create a cycle; an empty list falls back to the built-in preset
    pub fn new(presets: Vec<ParticlePreset>, selection: PresetSelection) -> Self {
        let presets = if presets.is_empty() {
            vec![ParticlePreset::default()]
        } else {
            presets
        };
        Self {
            presets,
            selection,
            current: None,
        }
    }

    /// All presets
    pub fn presets(&self) -> &[ParticlePreset] {
        &self.presets
    }

    /// Index of the active preset; the first preset before any advance
    pub fn current_index(&self) -> usize {
        self.current.unwrap_or(0)
    }

    /// Active preset
    pub fn current(&self) -> &ParticlePreset {
        &self.presets[self.current_index()]
    }

    /// Make preset `index` active
    pub fn select(&mut self, index: usize) -> Result<&ParticlePreset> {
        if index >= self.presets.len() {
            return Err(CoreError::PresetIndex {
                index,
                available: self.presets.len(),
            });
        }
        self.current = Some(index);
        Ok(&self.presets[index])
    }

    /// Move to the next preset and return its index.
    ///
    /// Lists shorter than three always step sequentially, since a random
    /// pick that excludes the current preset would be fixed anyway.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let len = self.presets.len();
        let next = match (self.current, self.selection) {
            (None, PresetSelection::Random) if len >= 3 => rng.random_range(0..len),
            (None, _) => 0,
            (Some(current), PresetSelection::Random) if len >= 3 => {
                let pick = rng.random_range(0..len - 1);
                if pick >= current {
                    pick + 1
                } else {
                    pick
                }
            }
            (Some(current), _) => (current + 1) % len,
        };
        self.current = Some(next);
        debug!("Switched to preset {} ({})", next, self.presets[next].name);
        next
    }
}
