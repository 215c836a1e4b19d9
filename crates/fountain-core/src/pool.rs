//! Fixed-capacity particle pool
//!
//! Particles live in a slot vector that grows lazily up to the capacity.
//! Slot indices move between an active list and a free stack, so a slot is
//! reused rather than reallocated once it has been created.

use crate::emitter::EmitterParameters;
use crate::particle::Particle;
use crate::{CoreError, Result};
use rand::Rng;
use tracing::{debug, warn};

/// Object pool partitioned into active and free particles.
///
/// `active_count() + free_count() == capacity()` holds at all times.
#[derive(Debug, Clone)]
pub struct ParticlePool {
    slots: Vec<Particle>,
    active: Vec<usize>,
    free: Vec<usize>,
    capacity: usize,
}

impl ParticlePool {
    /// Create an empty pool holding at most `capacity` particles
    pub fn new(capacity: usize) -> Self {
        debug!("Creating particle pool with capacity {}", capacity);
        Self {
            slots: Vec::new(),
            active: Vec::new(),
            free: Vec::new(),
            capacity,
        }
    }

    /// Maximum number of particles
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Particles currently in flight
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Free slots, including those not yet allocated
    pub fn free_count(&self) -> usize {
        self.free.len() + (self.capacity - self.slots.len())
    }

    /// True if no particle is in flight
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Release up to `count` particles from `params` at time `time`.
    ///
    /// Requests beyond the free capacity are dropped. Returns the number
    /// actually released, or [`CoreError::Allocation`] if the pool could not
    /// grow; in that case nothing is released.
    pub fn emit<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        params: &EmitterParameters,
        time: f64,
        rng: &mut R,
    ) -> Result<usize> {
        let count = count.min(self.free_count());
        if count == 0 {
            return Ok(0);
        }

        let fresh = count.saturating_sub(self.free.len());
        self.reserve(count, fresh).map_err(|_| {
            warn!("Particle pool failed to grow by {} slots", fresh);
            CoreError::Allocation { requested: fresh }
        })?;

        for _ in 0..count {
            let particle = Particle::spawn(params, time, rng);
            let index = match self.free.pop() {
                Some(index) => {
                    self.slots[index] = particle;
                    index
                }
                None => {
                    self.slots.push(particle);
                    self.slots.len() - 1
                }
            };
            self.active.push(index);
        }
        Ok(count)
    }

    fn reserve(
        &mut self,
        count: usize,
        fresh: usize,
    ) -> std::result::Result<(), std::collections::TryReserveError> {
        self.slots.try_reserve(fresh)?;
        self.active.try_reserve(count)?;
        // Expired fresh slots land on the free stack later
        self.free.try_reserve(fresh)?;
        Ok(())
    }

    /// Visit every active particle; those for which `keep` returns false
    /// move to the free set. Returns the number moved.
    pub fn retain_mut<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&mut Particle) -> bool,
    {
        let before = self.active.len();
        let slots = &mut self.slots;
        let free = &mut self.free;
        self.active.retain(|&index| {
            if keep(&mut slots[index]) {
                true
            } else {
                free.push(index);
                false
            }
        });
        before - self.active.len()
    }

    /// Move every particle expired at `time` to the free set
    pub fn expire(&mut self, time: f64) -> usize {
        self.retain_mut(|p| !p.is_expired(time))
    }

    /// Active particles in emission order
    pub fn iter(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.active.iter().map(move |&index| &self.slots[index])
    }

    /// Return every active particle to the free set
    pub fn clear(&mut self) {
        if !self.active.is_empty() {
            debug!("Clearing {} active particles", self.active.len());
        }
        self.free.append(&mut self.active);
    }
}
