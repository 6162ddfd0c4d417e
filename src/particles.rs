//! Live particle state owned by the morph engine.

use glam::Vec3;
use rand::Rng;

use crate::constants::{SCALE_FACTOR_MIN, SCALE_FACTOR_SPAN};

/// Fixed-size set of particles.
///
/// `current` and `target` always have the same length. Scale factors and seeds
/// are drawn once at construction; the only way to change the particle count
/// is to build a new set.
#[derive(Clone, Debug)]
pub struct ParticleSet {
    current: Vec<Vec3>,
    target: Vec<Vec3>,
    scale_factors: Vec<f32>,
    random_seeds: Vec<Vec3>,
}

impl ParticleSet {
    /// Build a set whose particles start at rest on `target`.
    pub fn new<R: Rng + ?Sized>(target: Vec<Vec3>, rng: &mut R) -> Self {
        let n = target.len();
        let scale_factors = (0..n)
            .map(|_| SCALE_FACTOR_MIN + rng.gen::<f32>() * SCALE_FACTOR_SPAN)
            .collect();
        let random_seeds = (0..n)
            .map(|_| Vec3::new(rng.gen(), rng.gen(), rng.gen()))
            .collect();
        Self {
            current: target.clone(),
            target,
            scale_factors,
            random_seeds,
        }
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn current(&self) -> &[Vec3] {
        &self.current
    }

    pub fn target(&self) -> &[Vec3] {
        &self.target
    }

    pub fn scale_factors(&self) -> &[f32] {
        &self.scale_factors
    }

    pub fn random_seeds(&self) -> &[Vec3] {
        &self.random_seeds
    }

    /// Replace the target buffer. Current positions are left where they are.
    ///
    /// A buffer of the wrong length is resized (truncated, or padded with the
    /// origin) so the lengths never diverge.
    pub fn set_target(&mut self, mut target: Vec<Vec3>) {
        if target.len() != self.current.len() {
            log::warn!(
                "target length {} does not match particle count {}, resizing",
                target.len(),
                self.current.len()
            );
            target.resize(self.current.len(), Vec3::ZERO);
        }
        self.target = target;
    }

    /// Move every particle a fraction `speed` of the way to its target.
    pub fn approach(&mut self, speed: f32) {
        let speed = speed.clamp(0.0, 1.0);
        for (c, t) in self.current.iter_mut().zip(&self.target) {
            *c += (*t - *c) * speed;
        }
    }

    /// Mean distance between current and target positions.
    pub fn mean_distance_to_target(&self) -> f32 {
        if self.current.is_empty() {
            return 0.0;
        }
        let sum: f32 = self
            .current
            .iter()
            .zip(&self.target)
            .map(|(c, t)| c.distance(*t))
            .sum();
        sum / self.current.len() as f32
    }

    #[cfg(test)]
    pub(crate) fn current_mut(&mut self) -> &mut [Vec3] {
        &mut self.current
    }
}
