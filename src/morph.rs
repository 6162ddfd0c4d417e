//! Per-frame particle update: morph toward the active shape, then displace a
//! render copy by gesture, idle breathing and beat explosions.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::Rng;

use crate::constants::*;
use crate::particles::ParticleSet;
use crate::shapes::{self, Shape};
use crate::spectrum::AudioBands;

/// One particle as handed to the renderer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 3],
    pub scale: f32,
    pub seed: [f32; 4],
}

/// Frame-global inputs to the displacement passes.
#[derive(Clone, Copy, Debug)]
pub struct FrameParams {
    pub time: f32,
    pub bands: AudioBands,
    pub audio_level: f32,
    pub gesture: f32,
    pub sensitivity: f32,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            time: 0.0,
            bands: AudioBands::SILENT,
            audio_level: 0.0,
            gesture: 1.0,
            sensitivity: DEFAULT_SENSITIVITY,
        }
    }
}

/// Fraction of the remaining distance covered per frame.
#[inline]
pub fn morph_speed(treble: f32) -> f32 {
    MORPH_SPEED_BASE + treble.clamp(0.0, 1.0) * MORPH_SPEED_TREBLE_GAIN
}

#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Overall scale applied to the cloud for a gesture factor.
#[inline]
pub fn gesture_scale(gesture: f32) -> f32 {
    GESTURE_SCALE_MIN + GESTURE_SCALE_SPAN * smoothstep(0.0, 1.0, gesture)
}

/// Scale by openness; a closing hand also twists the core about Z and ripples it.
pub fn gesture_transform(p: Vec3, gesture: f32, time: f32) -> Vec3 {
    let mut p = p * gesture_scale(gesture);
    if gesture < GESTURE_TWIST_THRESHOLD {
        let closed = 1.0 - gesture;
        let strength = GESTURE_TWIST_GAIN * closed;
        let dist = p.length();
        let falloff = (1.0 - dist / GESTURE_TWIST_RADIUS).max(0.0);
        let (s, c) = (strength * falloff).sin_cos();
        p = Vec3::new(p.x * c - p.y * s, p.x * s + p.y * c, p.z);
        p.z += (dist * GESTURE_RIPPLE_FREQ - time * GESTURE_RIPPLE_SPEED).sin() * closed;
    }
    p
}

/// Slow drift present even in silence, phased by the particle's own position.
#[inline]
pub fn breathing(p: Vec3, time: f32) -> Vec3 {
    let t = time * BREATH_RATE;
    Vec3::new((t + p.y).sin(), (t + p.z).cos(), (t + p.x).sin()) * BREATH_AMPLITUDE
}

/// Outward push along the particle's direction plus a fast shimmer, gated on
/// the smoothed pop level.
pub fn explosion(p: Vec3, audio_level: f32, sensitivity: f32, scale: f32, time: f32) -> Vec3 {
    if audio_level <= EXPLOSION_THRESHOLD {
        return Vec3::ZERO;
    }
    let push = p.normalize_or_zero() * audio_level * EXPLOSION_GAIN * sensitivity * scale;
    let vibration = (time * VIBRATION_RATE + p.x).sin() * audio_level * VIBRATION_GAIN;
    push + Vec3::splat(vibration)
}

/// Render position of one particle for this frame.
#[inline]
pub fn displace(current: Vec3, scale: f32, params: &FrameParams) -> Vec3 {
    let p = gesture_transform(current, params.gesture, params.time);
    let p = p + breathing(p, params.time);
    p + explosion(p, params.audio_level, params.sensitivity, scale, params.time)
}

/// Owns the particle set and advances it once per frame.
pub struct MorphEngine {
    particles: ParticleSet,
    shape: Shape,
    /// Targeting the spherical shell an unknown shape name falls back to.
    shell: bool,
    radius: f32,
    frame: Vec<ParticleVertex>,
}

impl MorphEngine {
    pub fn new(shape: Shape, count: usize, radius: f32) -> Self {
        Self::with_rng(shape, count, radius, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(shape: Shape, count: usize, radius: f32, rng: &mut R) -> Self {
        let target = shapes::generate_with_rng(shape, count, radius, rng);
        let particles = ParticleSet::new(target, rng);
        Self {
            frame: Vec::with_capacity(particles.len()),
            particles,
            shape,
            shell: false,
            radius,
        }
    }

    /// Last named shape. While [`is_shell`](Self::is_shell) is true the cloud
    /// is targeting the fallback shell instead.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn is_shell(&self) -> bool {
        self.shell
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    /// Start morphing toward `shape`. Current positions are kept, so the
    /// cloud flows from wherever it is.
    pub fn set_shape(&mut self, shape: Shape) {
        self.set_shape_with_rng(shape, &mut rand::thread_rng());
    }

    pub fn set_shape_with_rng<R: Rng + ?Sized>(&mut self, shape: Shape, rng: &mut R) {
        log::info!("morphing {} -> {}", self.shape, shape);
        self.shape = shape;
        self.shell = false;
        let target = self.generate_target(self.particles.len(), rng);
        self.particles.set_target(target);
    }

    /// Like [`set_shape`](Self::set_shape) but by name. An unknown name
    /// morphs to a spherical shell at the current radius and returns `None`.
    pub fn set_shape_named(&mut self, name: &str) -> Option<Shape> {
        self.set_shape_named_with_rng(name, &mut rand::thread_rng())
    }

    pub fn set_shape_named_with_rng<R: Rng + ?Sized>(&mut self, name: &str, rng: &mut R) -> Option<Shape> {
        match name.parse::<Shape>() {
            Ok(shape) => {
                self.set_shape_with_rng(shape, rng);
                Some(shape)
            }
            Err(e) => {
                log::warn!("{e}, morphing to a spherical shell instead");
                self.shell = true;
                let target = self.generate_target(self.particles.len(), rng);
                self.particles.set_target(target);
                None
            }
        }
    }

    /// Rebuild the particle set with `count` particles. Scale factors and seeds
    /// are redrawn; the new particles start on the target.
    pub fn resize(&mut self, count: usize) {
        if count == self.particles.len() {
            return;
        }
        log::info!("recreating particle set: {} -> {count}", self.particles.len());
        let mut rng = rand::thread_rng();
        let target = self.generate_target(count, &mut rng);
        self.particles = ParticleSet::new(target, &mut rng);
        self.frame = Vec::with_capacity(count);
    }

    fn generate_target<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Vec3> {
        if self.shell {
            shapes::generate_shell_with_rng(count, self.radius, rng)
        } else {
            shapes::generate_with_rng(self.shape, count, self.radius, rng)
        }
    }

    /// Morph one step and return the displaced render buffer.
    pub fn step(&mut self, params: &FrameParams) -> &[ParticleVertex] {
        self.particles.approach(morph_speed(params.bands.treble));
        self.frame.clear();
        let ps = &self.particles;
        self.frame.extend(
            ps.current()
                .iter()
                .zip(ps.scale_factors())
                .zip(ps.random_seeds())
                .map(|((&p, &scale), seed)| ParticleVertex {
                    position: displace(p, scale, params).to_array(),
                    scale,
                    seed: seed.extend(0.0).to_array(),
                }),
        );
        &self.frame
    }

    /// Render buffer from the most recent [`step`](Self::step).
    pub fn frame(&self) -> &[ParticleVertex] {
        &self.frame
    }
}
