//! Visualiser configuration file
//!
//! Values outside their documented range are clamped rather than rejected,
//! with a warning for each adjustment.

use crate::collision::Plane;
use crate::color::{HUE_RANGE, UNIT_RANGE};
use crate::color_cycler::ColorChannel;
use crate::logging::LogConfig;
use crate::modulation::{ModulationConfig, MAX_MODIFIER};
use crate::preset::{ParticlePreset, PresetSelection};
use crate::spectrum::{
    SpectrumConfig, MAX_BARS, MAX_FREQUENCY, MAX_LEVEL, MIN_FREQUENCY, MIN_LEVEL,
};
use crate::{Result, Vec3};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Largest particle pool a config may request
pub const MAX_CAPACITY: usize = 100_000;

/// Shortest allowed lifespan and smallest allowed size
const MIN_POSITIVE: f32 = 0.001;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FountainConfig {
    /// Maximum number of particles
    pub capacity: usize,
    /// Spectrum analysis
    pub spectrum: SpectrumConfig,
    /// Effects to rotate through
    pub presets: Vec<ParticlePreset>,
    /// Preset rotation order
    pub preset_selection: PresetSelection,
    /// Logging
    pub log: LogConfig,
}

impl Default for FountainConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            spectrum: SpectrumConfig::default(),
            presets: vec![ParticlePreset::default(), ParticlePreset::default()],
            preset_selection: PresetSelection::Cycle,
            log: LogConfig::default(),
        }
    }
}

impl FountainConfig {
    /// Load and sanitize a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Parse and sanitize TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.sanitize();
        Ok(config)
    }

    /// Serialize to TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Clamp every numeric field into its documented range.
    ///
    /// Returns the number of adjusted values.
    pub fn sanitize(&mut self) -> usize {
        let mut fixes = Fixes::default();

        fixes.usize("capacity", &mut self.capacity, 1, MAX_CAPACITY);
        sanitize_spectrum(&mut self.spectrum, &mut fixes);
        for (i, preset) in self.presets.iter_mut().enumerate() {
            sanitize_preset(&format!("presets[{}]", i), preset, &mut fixes);
        }
        if self.log.max_log_files == 0 {
            fixes.report("log.max_log_files", 0, 1);
            self.log.max_log_files = 1;
        }

        fixes.count
    }
}

#[derive(Default)]
struct Fixes {
    count: usize,
}

impl Fixes {
    fn report(&mut self, field: &str, from: impl std::fmt::Debug, to: impl std::fmt::Debug) {
        warn!("{} = {:?} is out of range, using {:?}", field, from, to);
        self.count += 1;
    }

    fn f32(&mut self, field: &str, value: &mut f32, min: f32, max: f32) {
        let clamped = if value.is_nan() {
            min
        } else {
            value.max(min).min(max)
        };
        if clamped != *value {
            self.report(field, *value, clamped);
            *value = clamped;
        }
    }

    fn usize(&mut self, field: &str, value: &mut usize, min: usize, max: usize) {
        let clamped = (*value).clamp(min, max);
        if clamped != *value {
            self.report(field, *value, clamped);
            *value = clamped;
        }
    }

    /// Swap a misordered `[lo, hi]` pair
    fn order(&mut self, field: &str, lo: &mut f32, hi: &mut f32) {
        if *lo > *hi {
            self.report(field, (*lo, *hi), (*hi, *lo));
            std::mem::swap(lo, hi);
        }
    }
}

fn sanitize_spectrum(spectrum: &mut SpectrumConfig, fixes: &mut Fixes) {
    fixes.usize("spectrum.bars", &mut spectrum.bars, 1, MAX_BARS);
    fixes.f32(
        "spectrum.min_frequency",
        &mut spectrum.min_frequency,
        MIN_FREQUENCY,
        MAX_FREQUENCY,
    );
    fixes.f32(
        "spectrum.max_frequency",
        &mut spectrum.max_frequency,
        MIN_FREQUENCY,
        MAX_FREQUENCY,
    );
    fixes.order(
        "spectrum.frequency_range",
        &mut spectrum.min_frequency,
        &mut spectrum.max_frequency,
    );
    if spectrum.min_frequency == spectrum.max_frequency {
        fixes.report(
            "spectrum.frequency_range",
            (spectrum.min_frequency, spectrum.max_frequency),
            (MIN_FREQUENCY, MAX_FREQUENCY),
        );
        spectrum.min_frequency = MIN_FREQUENCY;
        spectrum.max_frequency = MAX_FREQUENCY;
    }
    fixes.f32("spectrum.min_level", &mut spectrum.min_level, MIN_LEVEL, MAX_LEVEL);
    fixes.f32("spectrum.max_level", &mut spectrum.max_level, MIN_LEVEL, MAX_LEVEL);
    fixes.order(
        "spectrum.level_range",
        &mut spectrum.min_level,
        &mut spectrum.max_level,
    );
}

fn sanitize_channel(field: &str, channel: &mut ColorChannel, range: f32, fixes: &mut Fixes) {
    fixes.f32(&format!("{}.min", field), &mut channel.min, 0.0, range);
    fixes.f32(&format!("{}.max", field), &mut channel.max, 0.0, range);
    fixes.order(field, &mut channel.min, &mut channel.max);
    fixes.f32(
        &format!("{}.shift_rate", field),
        &mut channel.shift_rate,
        0.0,
        range,
    );
    fixes.f32(
        &format!("{}.variation", field),
        &mut channel.variation,
        0.0,
        range,
    );
}

fn sanitize_plane(field: &str, plane: &mut Plane, fixes: &mut Fixes) {
    fixes.f32(
        &format!("{}.restitution", field),
        &mut plane.restitution,
        0.0,
        1.0,
    );
    let normal = plane.normal.normalize_or_zero();
    if normal == Vec3::ZERO {
        fixes.report(&format!("{}.normal", field), plane.normal, Vec3::Z);
        plane.normal = Vec3::Z;
    } else {
        // Rescaling is not worth a warning
        plane.normal = normal;
    }
}

fn sanitize_modulation(field: &str, modulation: &mut ModulationConfig, fixes: &mut Fixes) {
    fixes.f32(
        &format!("{}.modifier", field),
        &mut modulation.modifier,
        -MAX_MODIFIER,
        MAX_MODIFIER,
    );
    if !modulation.vector.is_finite() {
        fixes.report(&format!("{}.vector", field), modulation.vector, Vec3::ZERO);
        modulation.vector = Vec3::ZERO;
    }
}

fn sanitize_preset(field: &str, preset: &mut ParticlePreset, fixes: &mut Fixes) {
    fixes.f32(
        &format!("{}.release_interval", field),
        &mut preset.release_interval,
        0.0,
        f32::MAX,
    );
    fixes.f32(
        &format!("{}.lifespan", field),
        &mut preset.lifespan,
        MIN_POSITIVE,
        f32::MAX,
    );
    fixes.f32(&format!("{}.size", field), &mut preset.size, MIN_POSITIVE, f32::MAX);
    fixes.f32(
        &format!("{}.velocity_variance", field),
        &mut preset.velocity_variance,
        0.0,
        f32::MAX,
    );
    fixes.f32(
        &format!("{}.rotation_sensitivity", field),
        &mut preset.rotation_sensitivity,
        0.0,
        1.0,
    );

    fixes.f32(&format!("{}.color.h", field), &mut preset.color.h, 0.0, HUE_RANGE);
    fixes.f32(&format!("{}.color.s", field), &mut preset.color.s, 0.0, UNIT_RANGE);
    fixes.f32(&format!("{}.color.v", field), &mut preset.color.v, 0.0, UNIT_RANGE);

    sanitize_channel(
        &format!("{}.colors.hue", field),
        &mut preset.colors.hue,
        HUE_RANGE,
        fixes,
    );
    sanitize_channel(
        &format!("{}.colors.saturation", field),
        &mut preset.colors.saturation,
        UNIT_RANGE,
        fixes,
    );
    sanitize_channel(
        &format!("{}.colors.value", field),
        &mut preset.colors.value,
        UNIT_RANGE,
        fixes,
    );

    sanitize_modulation(&format!("{}.gravity", field), &mut preset.gravity, fixes);
    sanitize_modulation(&format!("{}.wind", field), &mut preset.wind, fixes);
    sanitize_modulation(&format!("{}.velocity", field), &mut preset.velocity, fixes);
    sanitize_modulation(&format!("{}.position", field), &mut preset.position, fixes);

    for (i, plane) in preset.planes.iter_mut().enumerate() {
        sanitize_plane(&format!("{}.planes[{}]", field, i), plane, fixes);
    }
}
