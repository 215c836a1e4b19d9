//! Live emitter parameters and their cross-thread handoff

use crate::color::{ColorBounds, HsvColor};
use crate::Vec3;
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything that shapes the next batch of particles.
///
/// Rewritten once per audio update, read whole at the start of each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterParameters {
    /// Particles released per emission
    pub release_count: usize,
    /// Minimum time between emissions (seconds)
    pub release_interval: f32,
    /// Particle lifespan (seconds)
    pub lifespan: f32,
    /// Particle size (world units)
    pub size: f32,
    /// Spawn position
    pub position: Vec3,
    /// Base launch velocity
    pub velocity: Vec3,
    /// Constant acceleration
    pub gravity: Vec3,
    /// Velocity the air drags particles toward
    pub wind: Vec3,
    /// Radius of the random launch jitter
    pub velocity_variance: f32,
    /// Enable drag toward `wind`
    pub air_resistance: bool,
    /// Base color of the next batch
    pub color: HsvColor,
    /// Per-particle color scatter
    pub color_bounds: ColorBounds,
}

impl Default for EmitterParameters {
    fn default() -> Self {
        Self {
            release_count: 2,
            release_interval: 0.0,
            lifespan: 3.0,
            size: 0.4,
            position: Vec3::ZERO,
            velocity: Vec3::new(-4.0, 4.0, 0.0),
            gravity: Vec3::new(0.0, 0.0, -15.0),
            wind: Vec3::new(2.0, -2.0, 0.0),
            velocity_variance: 1.5,
            air_resistance: true,
            color: HsvColor::default(),
            color_bounds: ColorBounds::default(),
        }
    }
}

/// Atomically swapped [`EmitterParameters`] snapshot.
///
/// The audio side publishes complete snapshots; the simulation loads one per
/// tick. Readers never observe a partially updated parameter set.
#[derive(Debug)]
pub struct SharedEmitter {
    inner: ArcSwap<EmitterParameters>,
}

impl Default for SharedEmitter {
    fn default() -> Self {
        Self::new(EmitterParameters::default())
    }
}

impl SharedEmitter {
    /// Create with an initial snapshot
    pub fn new(params: EmitterParameters) -> Self {
        Self {
            inner: ArcSwap::from_pointee(params),
        }
    }

    /// Replace the current snapshot
    pub fn publish(&self, params: EmitterParameters) {
        self.inner.store(Arc::new(params));
    }

    /// Current snapshot
    pub fn load(&self) -> Arc<EmitterParameters> {
        self.inner.load_full()
    }
}
