//! Per-particle integration step

use crate::particle::Particle;
use crate::Vec3;

/// Advance `particle` by `dt` seconds using its frozen gravity and wind.
///
/// Air resistance pulls the velocity toward the wind velocity instead of
/// adding a wind force. Returns the position before the step, which the
/// collision pass restores on bounce or stick.
pub fn integrate(particle: &mut Particle, dt: f32) -> Vec3 {
    let snapshot = &particle.snapshot;
    particle.velocity += snapshot.gravity * dt;
    if snapshot.air_resistance {
        particle.velocity += (snapshot.wind - particle.velocity) * dt;
    }
    let previous = particle.position;
    particle.position += particle.velocity * dt;
    previous
}
