//! Audio-triggered scene rotation

use crate::spectrum::{SpectrumLevels, MAX_LEVEL};

/// Scene rotation that reverses on sudden level changes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    /// Angle advance per frame
    pub speed: f32,
    /// Accumulated angle
    pub angle: f32,
}

impl RotationState {
    /// Start at angle zero
    pub fn new(speed: f32) -> Self {
        Self { speed, angle: 0.0 }
    }

    /// Reverse direction when band `bar` jumps by more than
    /// `sensitivity` of full scale. Returns true on reversal.
    pub fn check_reversal(
        &mut self,
        levels: &SpectrumLevels,
        bar: usize,
        sensitivity: f32,
    ) -> bool {
        if levels.is_empty() {
            return false;
        }
        let delta = levels.delta(levels.band_index(bar));
        if delta > MAX_LEVEL * sensitivity {
            self.speed = -self.speed;
            true
        } else {
            false
        }
    }

    /// Advance one frame
    pub fn step(&mut self) {
        self.angle += self.speed;
    }
}
