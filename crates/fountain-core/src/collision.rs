//! Infinite-plane collisions
//!
//! Planes are evaluated in insertion order and every plane sees the particle,
//! so a particle in a corner can be constrained by two surfaces in the same
//! tick.

use crate::particle::Particle;
use crate::Vec3;
use serde::{Deserialize, Serialize};

/// Dead zone around a plane treated as touching it
pub const PLANE_EPSILON: f32 = 0.001;

/// What happens to a particle that crosses behind a plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionPolicy {
    /// Reflect the velocity, scaled by restitution along the normal
    #[default]
    Bounce,
    /// Stop dead at the pre-step position
    Stick,
    /// Expire on the next age check
    Recycle,
}

/// Side of a plane a point lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointClass {
    /// On the side the normal points to
    Front,
    /// Behind the plane
    Back,
    /// Within [`PLANE_EPSILON`] of the plane
    OnPlane,
}

/// Infinite collision plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Plane {
    /// Unit normal, pointing to the open side
    pub normal: Vec3,
    /// Any point on the plane
    pub point: Vec3,
    /// Fraction of normal velocity kept on bounce
    pub restitution: f32,
    /// Response to a crossing
    pub policy: CollisionPolicy,
}

impl Default for Plane {
    fn default() -> Self {
        Self {
            normal: Vec3::Z,
            point: Vec3::ZERO,
            restitution: 1.0,
            policy: CollisionPolicy::Bounce,
        }
    }
}

impl Plane {
    /// Create a plane; the normal is normalized
    pub fn new(normal: Vec3, point: Vec3, restitution: f32, policy: CollisionPolicy) -> Self {
        Self {
            normal: normal.normalize_or_zero(),
            point,
            restitution,
            policy,
        }
    }

    /// Classify `position` by its signed distance along the normal
    pub fn classify_point(&self, position: Vec3) -> PointClass {
        let d = (self.point - position).dot(self.normal);
        if d < -PLANE_EPSILON {
            PointClass::Front
        } else if d > PLANE_EPSILON {
            PointClass::Back
        } else {
            PointClass::OnPlane
        }
    }

    /// Apply this plane's policy if `particle` has crossed behind it.
    /// Returns true on collision.
    pub fn collide(&self, particle: &mut Particle, previous: Vec3) -> bool {
        if self.classify_point(particle.position) != PointClass::Back {
            return false;
        }
        match self.policy {
            CollisionPolicy::Bounce => {
                particle.position = previous;
                let v = particle.velocity;
                let vn = self.normal * self.normal.dot(v);
                let vt = v - vn;
                particle.velocity = vt - vn * self.restitution;
            }
            CollisionPolicy::Stick => {
                particle.position = previous;
                particle.velocity = Vec3::ZERO;
            }
            CollisionPolicy::Recycle => particle.recycle(),
        }
        true
    }
}

/// Resolve `particle` against every plane in order; returns the number of
/// planes it collided with
pub fn resolve(particle: &mut Particle, previous: Vec3, planes: &[Plane]) -> usize {
    let mut hits = 0;
    for plane in planes {
        if plane.collide(particle, previous) {
            hits += 1;
        }
    }
    hits
}
