//! Single particle state

use crate::color::HsvColor;
use crate::emitter::EmitterParameters;
use crate::Vec3;
use rand::Rng;
use std::f32::consts::PI;

/// Shortest lifespan a particle is released with (seconds)
pub const MIN_LIFESPAN: f32 = 0.001;

/// Emitter values frozen into a particle when it is released.
///
/// Later emitter changes never reach particles already in flight. A
/// non-positive or NaN lifespan is raised to [`MIN_LIFESPAN`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSnapshot {
    /// Lifespan (seconds)
    pub lifespan: f32,
    /// Size (world units)
    pub size: f32,
    /// Constant acceleration
    pub gravity: Vec3,
    /// Drag target velocity
    pub wind: Vec3,
    /// Drag toward `wind` enabled
    pub air_resistance: bool,
    /// Launch jitter radius
    pub velocity_variance: f32,
}

impl From<&EmitterParameters> for ParticleSnapshot {
    fn from(params: &EmitterParameters) -> Self {
        Self {
            lifespan: params.lifespan.max(MIN_LIFESPAN),
            size: params.size,
            gravity: params.gravity,
            wind: params.wind,
            air_resistance: params.air_resistance,
            velocity_variance: params.velocity_variance,
        }
    }
}

/// A live particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Current position
    pub position: Vec3,
    /// Current velocity
    pub velocity: Vec3,
    /// Color drawn at emission
    pub color: HsvColor,
    /// Simulation time of emission (seconds)
    pub created_at: f64,
    /// Frozen emitter values
    pub snapshot: ParticleSnapshot,
}

impl Particle {
    /// Release a particle from `params` at simulation time `time`
    pub fn spawn<R: Rng + ?Sized>(params: &EmitterParameters, time: f64, rng: &mut R) -> Self {
        let mut velocity = params.velocity;
        if params.velocity_variance != 0.0 {
            velocity += random_unit_vector(rng) * params.velocity_variance;
        }
        Self {
            position: params.position,
            velocity,
            color: params.color.vary(&params.color_bounds, rng),
            created_at: time,
            snapshot: ParticleSnapshot::from(params),
        }
    }

    /// Seconds since emission
    pub fn age(&self, time: f64) -> f64 {
        time - self.created_at
    }

    /// True once the particle has lived its full lifespan
    pub fn is_expired(&self, time: f64) -> bool {
        self.age(time) >= f64::from(self.snapshot.lifespan)
    }

    /// Rewind the emission time by one lifespan so the next age check
    /// expires the particle
    pub fn recycle(&mut self) {
        self.created_at -= f64::from(self.snapshot.lifespan);
    }

    /// Rendered size
    pub fn size(&self) -> f32 {
        self.snapshot.size
    }
}

/// Uniformly distributed point on the unit sphere
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let z: f32 = rng.random_range(-1.0..=1.0);
    let t: f32 = rng.random_range(-PI..=PI);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(t.cos() * r, t.sin() * r, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_unit_vector_length() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_unit_vectors_cover_sphere() {
        let mut rng = StdRng::seed_from_u64(12);
        let mean = (0..4000)
            .map(|_| random_unit_vector(&mut rng))
            .fold(Vec3::ZERO, |acc, v| acc + v)
            / 4000.0;
        assert!(mean.length() < 0.1, "biased mean {:?}", mean);
    }

    #[test]
    fn test_spawn_freezes_parameters() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut params = EmitterParameters {
            velocity_variance: 0.0,
            position: Vec3::new(1.0, 2.0, 3.0),
            ..Default::default()
        };
        let particle = Particle::spawn(&params, 5.0, &mut rng);

        params.gravity = Vec3::ZERO;
        params.lifespan = 100.0;

        assert_eq!(particle.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(particle.velocity, Vec3::new(-4.0, 4.0, 0.0));
        assert_eq!(particle.snapshot.gravity, Vec3::new(0.0, 0.0, -15.0));
        assert_eq!(particle.snapshot.lifespan, 3.0);
        assert_eq!(particle.created_at, 5.0);
    }

    #[test]
    fn test_velocity_jitter_radius() {
        let mut rng = StdRng::seed_from_u64(14);
        let params = EmitterParameters::default();
        for _ in 0..200 {
            let p = Particle::spawn(&params, 0.0, &mut rng);
            let jitter = (p.velocity - params.velocity).length();
            assert!((jitter - params.velocity_variance).abs() < 1e-3);
        }
    }

    #[test]
    fn test_expiry_and_recycle() {
        let mut rng = StdRng::seed_from_u64(15);
        let mut p = Particle::spawn(&EmitterParameters::default(), 10.0, &mut rng);
        assert!(!p.is_expired(12.0));
        assert!(p.is_expired(13.0));

        p.recycle();
        assert!(p.is_expired(10.0));
    }

    #[test]
    fn test_non_positive_lifespan_is_raised() {
        let mut rng = StdRng::seed_from_u64(16);
        for lifespan in [0.0, -2.0, f32::NAN] {
            let params = EmitterParameters {
                lifespan,
                ..Default::default()
            };
            let p = Particle::spawn(&params, 4.0, &mut rng);
            assert_eq!(p.snapshot.lifespan, MIN_LIFESPAN);
            assert!(!p.is_expired(4.0));
        }
    }
}
