//! Camera description shared by the CPU sizing code and the renderer.

use glam::{Mat4, Vec3};

use crate::constants::{CAMERA_DISTANCE, CAMERA_FOVY_DEGREES, CAMERA_ORBIT_RATE};

/// Right-handed perspective camera that slowly orbits the origin about Y.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
    pub orbit_rate: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, CAMERA_DISTANCE),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 16.0 / 9.0,
            fovy_radians: CAMERA_FOVY_DEGREES.to_radians(),
            znear: 0.1,
            zfar: 1000.0,
            orbit_rate: CAMERA_ORBIT_RATE,
        }
    }
}

impl Camera {
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Distance of `p` in front of the eye along the view direction.
    pub fn view_depth(&self, p: Vec3) -> f32 {
        -self.view_matrix().transform_point3(p).z
    }

    /// Rotate the eye about the target's Y axis by `orbit_rate * dt_sec`.
    pub fn orbit(&mut self, dt_sec: f32) {
        let angle = self.orbit_rate * dt_sec;
        let offset = self.eye - self.target;
        let (s, c) = angle.sin_cos();
        let rotated = Vec3::new(offset.x * c + offset.z * s, offset.y, -offset.x * s + offset.z * c);
        self.eye = self.target + rotated;
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}
