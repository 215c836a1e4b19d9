//! Host-facing entry points
//!
//! A host drives two independent cadences: [`Visualizer::audio_update`] when
//! a new spectrum arrives and [`Visualizer::frame`] once per rendered frame.
//! The only state passed between them is the emitter snapshot.

use crate::collision::Plane;
use crate::color::HsvColor;
use crate::color_cycler::ColorCycler;
use crate::config::FountainConfig;
use crate::emitter::{EmitterParameters, SharedEmitter};
use crate::modulation::shift;
use crate::particle::Particle;
use crate::preset::{ParticlePreset, PresetCycle};
use crate::rotation::RotationState;
use crate::simulation::{ParticleSimulation, TickReport};
use crate::spectrum::{SpectrumBinner, SpectrumLevels};
use crate::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Audio-reactive particle fountain
#[derive(Debug)]
pub struct Visualizer {
    binner: SpectrumBinner,
    levels: SpectrumLevels,
    presets: PresetCycle,
    cycler: ColorCycler,
    rotation: RotationState,
    simulation: ParticleSimulation,
    rng: StdRng,
    audio_time: f64,
}

impl Visualizer {
    /// Create a visualiser seeded from OS entropy
    pub fn new(config: &FountainConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Create a visualiser with a deterministic random source
    pub fn with_seed(config: &FountainConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &FountainConfig, rng: StdRng) -> Self {
        let presets = PresetCycle::new(config.presets.clone(), config.preset_selection);
        let preset = presets.current();
        let cycler = ColorCycler::new(preset.color);
        let rotation = RotationState::new(preset.rotation_speed);
        let simulation = ParticleSimulation::new(config.capacity, preset.emitter_parameters());

        debug!(
            "Visualizer created: {} presets, {} bars, capacity {}",
            presets.presets().len(),
            config.spectrum.bars,
            config.capacity
        );

        Self {
            binner: SpectrumBinner::new(config.spectrum.clone()),
            levels: SpectrumLevels::new(config.spectrum.bars),
            presets,
            cycler,
            rotation,
            simulation,
            rng,
            audio_time: 0.0,
        }
    }

    /// Begin a new track: switch to the next preset and reset all
    /// audio-driven state
    pub fn start(&mut self, sample_rate: f32) {
        self.levels.reset_previous();
        let index = self.presets.advance(&mut self.rng);
        let preset = self.presets.current();

        self.cycler.reset(preset.color);
        self.rotation = RotationState::new(preset.rotation_speed);
        self.simulation.set_emitter(preset.emitter_parameters());
        self.simulation.set_planes(preset.planes.clone());
        self.simulation.clear();
        self.audio_time = 0.0;

        info!(
            "Starting preset {} '{}' at {} Hz",
            index, preset.name, sample_rate
        );
    }

    /// Feed one spectrum.
    ///
    /// `magnitudes` holds two interleaved values per frequency bin. Runs the
    /// binner, rotation check, color cycle, release-count and vector
    /// modulation, then publishes the resulting emitter snapshot.
    pub fn audio_update(&mut self, magnitudes: &[f32], sample_rate: f32, elapsed: f32) {
        if elapsed.is_finite() && elapsed > 0.0 {
            self.audio_time += f64::from(elapsed);
        }
        self.binner
            .process(magnitudes, sample_rate, &mut self.levels);

        let preset = self.presets.current();
        let levels = &self.levels;
        let rng = &mut self.rng;

        if self
            .rotation
            .check_reversal(levels, preset.rotation_bar, preset.rotation_sensitivity)
        {
            trace!("Rotation reversed at t={:.3}", self.audio_time);
        }

        let color = self.cycler.update(&preset.colors, levels);
        let params = EmitterParameters {
            release_count: preset.release_count_for(levels),
            gravity: shift(&preset.gravity, levels, rng),
            wind: shift(&preset.wind, levels, rng),
            velocity: shift(&preset.velocity, levels, rng),
            position: shift(&preset.position, levels, rng),
            color,
            ..preset.emitter_parameters()
        };
        self.simulation.set_emitter(params);
    }

    /// Advance one video frame of `dt` seconds
    pub fn frame(&mut self, dt: f32) -> TickReport {
        self.rotation.step();
        self.simulation.tick(dt, &mut self.rng)
    }

    /// Add a collision plane to the running scene. A later [`start`](Self::start)
    /// installs the next preset's planes instead.
    pub fn add_plane(&mut self, plane: Plane) {
        self.simulation.add_plane(plane);
    }

    /// Remove every collision plane from the running scene
    pub fn clear_planes(&mut self) {
        self.simulation.clear_planes();
    }

    /// Release up to `count` particles immediately
    pub fn emit(&mut self, count: usize) -> Result<usize> {
        self.simulation.emit(count, &mut self.rng)
    }

    /// Active particles for rendering
    pub fn particles(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.simulation.particles()
    }

    /// Oscillator color without the audio offset
    pub fn base_color(&self) -> HsvColor {
        self.cycler.base()
    }

    /// Current emitter snapshot
    pub fn emitter(&self) -> Arc<EmitterParameters> {
        self.simulation.emitter()
    }

    /// Handle for publishing emitter snapshots from another thread
    pub fn shared_emitter(&self) -> Arc<SharedEmitter> {
        self.simulation.shared_emitter()
    }

    /// Scene rotation
    pub fn rotation(&self) -> RotationState {
        self.rotation
    }

    /// Latest spectrum bars
    pub fn levels(&self) -> &SpectrumLevels {
        &self.levels
    }

    /// Preset currently driving the emitter
    pub fn active_preset(&self) -> &ParticlePreset {
        self.presets.current()
    }

    /// Index of the active preset
    pub fn active_preset_index(&self) -> usize {
        self.presets.current_index()
    }

    /// Particle simulation
    pub fn simulation(&self) -> &ParticleSimulation {
        &self.simulation
    }

    /// Audio time accumulated since the last start (seconds)
    pub fn audio_time(&self) -> f64 {
        self.audio_time
    }
}
