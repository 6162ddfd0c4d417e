//! Per-frame snapshot handed to the shading stage.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::config::Palette;
use crate::spectrum::AudioBands;

/// Everything the shading program reads besides the particle buffer.
/// Built once per frame and never mutated while the frame is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderUniforms {
    pub time: f32,
    pub bands: AudioBands,
    pub audio_level: f32,
    pub gesture: f32,
    pub palette: Palette,
    pub point_size: f32,
    pub sensitivity: f32,
    pub pixel_density: f32,
}

/// GPU layout of [`RenderUniforms`] plus camera and viewport.
/// Matches `Uniforms` in `shaders/particles.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GpuUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub resolution: [f32; 2],
    pub time: f32,
    pub audio_level: f32,
    /// bass, mid, treble, gesture
    pub bands: [f32; 4],
    /// point size, sensitivity, pixel density, unused
    pub params: [f32; 4],
    pub primary: [f32; 4],
    pub secondary: [f32; 4],
    pub accent: [f32; 4],
}

impl RenderUniforms {
    pub fn pack(&self, view_proj: Mat4, resolution: [f32; 2]) -> GpuUniforms {
        let rgba = |c: [f32; 3]| [c[0], c[1], c[2], 1.0];
        GpuUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            resolution,
            time: self.time,
            audio_level: self.audio_level,
            bands: [self.bands.bass, self.bands.mid, self.bands.treble, self.gesture],
            params: [self.point_size, self.sensitivity, self.pixel_density, 0.0],
            primary: rgba(self.palette.primary),
            secondary: rgba(self.palette.secondary),
            accent: rgba(self.palette.accent),
        }
    }
}
