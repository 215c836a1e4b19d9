//! Frame-tick driver: expiry, physics, collisions and scheduled emission

use crate::collision::{resolve, Plane};
use crate::emitter::{EmitterParameters, SharedEmitter};
use crate::particle::Particle;
use crate::physics::integrate;
use crate::pool::ParticlePool;
use crate::Result;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, trace};

/// Longest step a single tick will integrate (seconds)
pub const MAX_TICK: f32 = 0.25;

/// Outcome of one [`ParticleSimulation::tick`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Particles moved to the free set by age
    pub expired: usize,
    /// Particles released this tick
    pub emitted: usize,
    /// Plane collisions resolved
    pub collisions: usize,
    /// Particles in flight after the tick
    pub active: usize,
    /// The pool could not grow for this tick's emission
    pub emission_failed: bool,
}

/// Particle pool, collision planes and the simulation clock
#[derive(Debug)]
pub struct ParticleSimulation {
    pool: ParticlePool,
    planes: Vec<Plane>,
    emitter: Arc<SharedEmitter>,
    time: f64,
    last_emit: f64,
}

impl ParticleSimulation {
    /// Create a simulation holding at most `capacity` particles
    pub fn new(capacity: usize, params: EmitterParameters) -> Self {
        Self {
            pool: ParticlePool::new(capacity),
            planes: Vec::new(),
            emitter: Arc::new(SharedEmitter::new(params)),
            time: 0.0,
            last_emit: 0.0,
        }
    }

    /// Simulation clock (seconds)
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Underlying pool
    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    /// Active particles, for rendering
    pub fn particles(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.pool.iter()
    }

    /// Handle for publishing emitter snapshots from another thread
    pub fn shared_emitter(&self) -> Arc<SharedEmitter> {
        Arc::clone(&self.emitter)
    }

    /// Current emitter snapshot
    pub fn emitter(&self) -> Arc<EmitterParameters> {
        self.emitter.load()
    }

    /// Publish a new emitter snapshot; in-flight particles are unaffected
    pub fn set_emitter(&self, params: EmitterParameters) {
        self.emitter.publish(params);
    }

    /// Collision planes in evaluation order
    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Append a plane; it is evaluated after the existing ones
    pub fn add_plane(&mut self, plane: Plane) {
        self.planes.push(plane);
        debug!("Added collision plane ({} total)", self.planes.len());
    }

    /// Replace every plane
    pub fn set_planes(&mut self, planes: Vec<Plane>) {
        self.planes = planes;
        debug!("Installed {} collision planes", self.planes.len());
    }

    /// Remove every plane
    pub fn clear_planes(&mut self) {
        self.planes.clear();
        debug!("Cleared collision planes");
    }

    /// Return every particle to the free set
    pub fn clear(&mut self) {
        self.pool.clear();
    }

    /// Release up to `count` particles from the current snapshot now
    pub fn emit<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> Result<usize> {
        let params = self.emitter.load();
        self.pool.emit(count, &params, self.time, rng)
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Expired particles are freed, the rest are integrated and collided,
    /// then a batch is released if the release interval has elapsed.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> TickReport {
        let dt = clamp_dt(dt);
        let params = self.emitter.load();
        self.time += f64::from(dt);

        let time = self.time;
        let planes = &self.planes;
        let mut collisions = 0;
        let expired = self.pool.retain_mut(|particle| {
            if particle.is_expired(time) {
                return false;
            }
            let previous = integrate(particle, dt);
            collisions += resolve(particle, previous, planes);
            true
        });

        let mut report = TickReport {
            expired,
            collisions,
            ..Default::default()
        };

        if self.time - self.last_emit > f64::from(params.release_interval) {
            self.last_emit = self.time;
            match self.pool.emit(params.release_count, &params, self.time, rng) {
                Ok(emitted) => report.emitted = emitted,
                Err(_) => report.emission_failed = true,
            }
        }

        report.active = self.pool.active_count();
        trace!(
            "tick t={:.3} active={} expired={} emitted={} collisions={}",
            self.time,
            report.active,
            report.expired,
            report.emitted,
            report.collisions
        );
        report
    }
}

/// Pin a frame delta into `[0, MAX_TICK]`; non-finite deltas become zero
pub fn clamp_dt(dt: f32) -> f32 {
    if !dt.is_finite() {
        debug!("Discarding non-finite frame delta");
        return 0.0;
    }
    let clamped = dt.max(0.0).min(MAX_TICK);
    if clamped != dt {
        debug!("Clamped frame delta {} to {}", dt, clamped);
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionPolicy;
    use crate::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn still_params() -> EmitterParameters {
        EmitterParameters {
            release_count: 0,
            velocity_variance: 0.0,
            air_resistance: false,
            gravity: Vec3::ZERO,
            velocity: Vec3::ZERO,
            ..Default::default()
        }
    }

    #[test]
    fn test_clamp_dt() {
        assert_eq!(clamp_dt(0.016), 0.016);
        assert_eq!(clamp_dt(-1.0), 0.0);
        assert_eq!(clamp_dt(10.0), MAX_TICK);
        assert_eq!(clamp_dt(f32::NAN), 0.0);
        assert_eq!(clamp_dt(f32::INFINITY), 0.0);
    }

    #[test]
    fn test_release_interval() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sim = ParticleSimulation::new(
            100,
            EmitterParameters {
                release_count: 3,
                release_interval: 0.1,
                ..still_params()
            },
        );
        assert_eq!(sim.tick(0.05, &mut rng).emitted, 0);
        assert_eq!(sim.tick(0.06, &mut rng).emitted, 3);
        assert_eq!(sim.tick(0.05, &mut rng).emitted, 0);
        assert_eq!(sim.pool().active_count(), 3);
    }

    #[test]
    fn test_zero_interval_emits_every_tick() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut sim = ParticleSimulation::new(
            100,
            EmitterParameters {
                release_count: 2,
                ..still_params()
            },
        );
        for _ in 0..5 {
            assert_eq!(sim.tick(0.01, &mut rng).emitted, 2);
        }
        assert_eq!(sim.pool().active_count(), 10);
    }

    #[test]
    fn test_particles_expire_after_lifespan() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut sim = ParticleSimulation::new(
            10,
            EmitterParameters {
                lifespan: 0.5,
                ..still_params()
            },
        );
        sim.emit(4, &mut rng).unwrap();
        let mut expired = 0;
        for _ in 0..4 {
            expired += sim.tick(0.2, &mut rng).expired;
        }
        assert_eq!(expired, 4);
        assert!(sim.pool().is_empty());
    }

    #[test]
    fn test_emitter_change_spares_in_flight_particles() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut sim = ParticleSimulation::new(
            10,
            EmitterParameters {
                gravity: Vec3::new(0.0, 0.0, -10.0),
                ..still_params()
            },
        );
        sim.emit(1, &mut rng).unwrap();
        sim.set_emitter(still_params());
        sim.tick(0.1, &mut rng);

        let p = sim.particles().next().unwrap();
        assert!((p.velocity.z + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_bounce_on_floor() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut sim = ParticleSimulation::new(
            1,
            EmitterParameters {
                position: Vec3::new(0.0, 0.0, 0.05),
                velocity: Vec3::new(0.0, 0.0, -1.0),
                ..still_params()
            },
        );
        sim.add_plane(Plane::new(Vec3::Z, Vec3::ZERO, 1.0, CollisionPolicy::Bounce));
        sim.emit(1, &mut rng).unwrap();

        let report = sim.tick(0.1, &mut rng);
        assert_eq!(report.collisions, 1);
        let p = sim.particles().next().unwrap();
        assert_eq!(p.position, Vec3::new(0.0, 0.0, 0.05));
        assert_eq!(p.velocity, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_plane_list_management() {
        let mut sim = ParticleSimulation::new(1, still_params());
        sim.add_plane(Plane::default());
        sim.add_plane(Plane::new(Vec3::X, Vec3::ZERO, 0.5, CollisionPolicy::Stick));
        assert_eq!(sim.planes().len(), 2);
        assert_eq!(sim.planes()[1].policy, CollisionPolicy::Stick);
        sim.clear_planes();
        assert!(sim.planes().is_empty());
    }

    #[test]
    fn test_published_zero_lifespan_still_emits_live_particles() {
        let mut rng = StdRng::seed_from_u64(7);
        let sim_params = EmitterParameters {
            release_count: 3,
            ..still_params()
        };
        let mut sim = ParticleSimulation::new(10, sim_params.clone());
        sim.shared_emitter().publish(EmitterParameters {
            lifespan: -1.0,
            ..sim_params
        });

        let report = sim.tick(0.01, &mut rng);
        assert_eq!(report.emitted, 3);
        let time = sim.time();
        assert!(sim.particles().all(|p| !p.is_expired(time)));

        // Gone after the minimum lifespan
        assert_eq!(sim.tick(0.01, &mut rng).expired, 3);
    }

    #[test]
    fn test_bad_dt_does_not_move_particles() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut sim = ParticleSimulation::new(
            1,
            EmitterParameters {
                velocity: Vec3::X,
                ..still_params()
            },
        );
        sim.emit(1, &mut rng).unwrap();
        sim.tick(f32::NAN, &mut rng);
        sim.tick(-3.0, &mut rng);
        assert_eq!(sim.time(), 0.0);
        assert_eq!(sim.particles().next().unwrap().position, Vec3::ZERO);
    }
}
