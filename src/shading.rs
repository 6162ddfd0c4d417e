//! CPU reference for the per-particle shading program.
//!
//! `shaders/particles.wgsl` implements the same math on the GPU; these
//! functions pin the contract down and keep it testable.

use glam::{Vec2, Vec3, Vec4};

use crate::constants::*;
use crate::morph::smoothstep;
use crate::uniforms::RenderUniforms;

/// Sprite diameter in pixels for one particle.
///
/// `view_depth` is the distance in front of the camera; points at or behind
/// the eye get size zero.
pub fn point_size(base_size: f32, scale: f32, pixel_density: f32, audio_level: f32, view_depth: f32) -> f32 {
    if view_depth <= 0.0 {
        return 0.0;
    }
    base_size * scale * pixel_density * (1.0 + audio_level * POINT_AUDIO_GAIN) * (POINT_ATTENUATION / view_depth)
}

/// Rotate `color` about the grey axis by `angle` radians.
pub fn hue_shift(color: Vec3, angle: f32) -> Vec3 {
    let k = Vec3::splat(1.0 / 3.0_f32.sqrt());
    let (s, c) = angle.sin_cos();
    color * c + k.cross(color) * s + k * k.dot(color) * (1.0 - c)
}

/// Radial brightness for a distance `d` from the sprite centre (0 at the rim).
#[inline]
pub fn radial_falloff(d: f32) -> f32 {
    (1.0 - 2.0 * d).max(0.0).powf(FALLOFF_EXPONENT)
}

/// Colour and alpha at `point_coord` (0..1 across the sprite), or `None` when
/// the fragment lies outside the circular footprint.
pub fn shade_fragment(point_coord: Vec2, seed: Vec3, u: &RenderUniforms) -> Option<Vec4> {
    let d = point_coord.distance(Vec2::splat(0.5));
    if d > POINT_FOOTPRINT_RADIUS {
        return None;
    }
    let falloff = radial_falloff(d);
    let core = hue_shift(Vec3::from(u.palette.primary), (seed.x - 0.5) * HUE_JITTER_RADIANS);
    let rim = hue_shift(Vec3::from(u.palette.secondary), (seed.y - 0.5) * HUE_JITTER_RADIANS);
    let mut color = rim.lerp(core, falloff);

    let flash = (smoothstep(0.4, 0.6, falloff) * u.bands.bass * u.sensitivity).clamp(0.0, 1.0);
    color = color.lerp(Vec3::from(u.palette.accent), flash);

    let alpha = (ALPHA_BASE + u.bands.treble * ALPHA_TREBLE_GAIN) * falloff;
    Some(color.extend(alpha))
}
