//! Fountain Core - Audio-Reactive Particle Simulation
//!
//! This crate contains the simulation core of the Fountain visualiser:
//! - Spectrum bucketing and leveling
//! - Audio-to-vector modulation ("shift")
//! - Oscillating base color cycling
//! - Fixed-capacity particle pool with emission scheduling
//! - Per-particle physics and plane collisions
//!
//! Rendering, audio capture and plugin lifecycle live outside this crate.

#![warn(missing_docs)]

pub use glam::Vec3;
use thiserror::Error;

pub mod collision;
pub mod color;
pub mod color_cycler;
pub mod config;
pub mod emitter;
pub mod logging;
pub mod modulation;
pub mod particle;
pub mod physics;
pub mod pool;
pub mod preset;
pub mod rotation;
pub mod simulation;
pub mod spectrum;
pub mod visualizer;

// --- Re-exports grouped by category ---

// Audio analysis
pub use modulation::{shift, LevelMode, ModificationMode, ModulationConfig};
pub use spectrum::{FrequencyScale, SpectrumBinner, SpectrumConfig, SpectrumLevels, MAX_LEVEL};

// Color
pub use color::{ChannelBounds, ColorBounds, HsvColor};
pub use color_cycler::{ColorChannel, ColorCycler, ColorCyclerConfig};

// Particles & physics
pub use collision::{CollisionPolicy, Plane, PointClass};
pub use emitter::{EmitterParameters, SharedEmitter};
pub use particle::{Particle, ParticleSnapshot};
pub use pool::ParticlePool;
pub use simulation::{ParticleSimulation, TickReport};

// Presets, configuration & lifecycle
pub use config::FountainConfig;
pub use logging::LogConfig;
pub use preset::{ParticlePreset, PresetCycle, PresetSelection};
pub use rotation::RotationState;
pub use visualizer::Visualizer;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration value or file
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O error (config files, log directory)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Growing the particle pool failed
    #[error("Failed to allocate {requested} particle slots")]
    Allocation {
        /// Number of slots that were requested
        requested: usize,
    },

    /// Preset index out of range
    #[error("Preset index {index} out of range ({available} available)")]
    PresetIndex {
        /// Requested index
        index: usize,
        /// Number of presets available
        available: usize,
    },
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::Config("bad bars".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: bad bars");
    }

    #[test]
    fn test_allocation_error_display() {
        let err = CoreError::Allocation { requested: 64 };
        assert!(err.to_string().contains("64"));
    }

    #[test]
    fn test_preset_index_display() {
        let err = CoreError::PresetIndex {
            index: 5,
            available: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains('5'));
        assert!(msg.contains('2'));
    }
}
