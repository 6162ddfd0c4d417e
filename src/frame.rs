//! One render-loop tick: pull audio, read the latest gesture, step the morph
//! engine and build this frame's uniforms.

use glam::Mat4;
use instant::Instant;

use crate::audio::{AudioFrame, AudioSession, FrequencySource};
use crate::config::VisualConfig;
use crate::error::ConfigError;
use crate::gesture::{GestureStatus, OPEN_HAND};
use crate::morph::{FrameParams, MorphEngine, ParticleVertex};
use crate::shapes::Shape;
use crate::signal::Subscriber;
use crate::state::Camera;
use crate::uniforms::RenderUniforms;

/// Wall-clock time since start and since the previous tick.
pub struct FrameClock {
    start: Instant,
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
        }
    }

    /// `(elapsed_sec, dt_sec)`
    pub fn tick(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let dt = now - self.last;
        self.last = now;
        ((now - self.start).as_secs_f32(), dt.as_secs_f32())
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// What the renderer needs for one frame.
pub struct Frame<'a> {
    pub particles: &'a [ParticleVertex],
    pub uniforms: RenderUniforms,
    pub view_proj: Mat4,
}

pub struct Visualizer {
    config: VisualConfig,
    engine: MorphEngine,
    audio: AudioSession,
    gesture: Option<Subscriber<f32>>,
    gesture_status: Option<Subscriber<GestureStatus>>,
    gesture_factor: f32,
    camera: Camera,
    clock: FrameClock,
    last_audio: AudioFrame,
}

impl Visualizer {
    pub fn new(config: VisualConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = MorphEngine::new(config.shape, config.particle_count, config.radius);
        log::info!(
            "visualizer ready: {} particles, shape {}, radius {}",
            config.particle_count,
            config.shape,
            config.radius
        );
        Ok(Self {
            engine,
            config,
            audio: AudioSession::new(),
            gesture: None,
            gesture_status: None,
            gesture_factor: OPEN_HAND,
            camera: Camera::default(),
            clock: FrameClock::new(),
            last_audio: AudioFrame::default(),
        })
    }

    /// Read gesture factor and status from a running tracker.
    pub fn attach_gesture(&mut self, factor: Subscriber<f32>, status: Subscriber<GestureStatus>) {
        self.gesture = Some(factor);
        self.gesture_status = Some(status);
    }

    pub fn detach_gesture(&mut self) {
        self.gesture = None;
        self.gesture_status = None;
        self.gesture_factor = OPEN_HAND;
    }

    pub fn config(&self) -> &VisualConfig {
        &self.config
    }

    pub fn engine(&self) -> &MorphEngine {
        &self.engine
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn gesture_factor(&self) -> f32 {
        self.gesture_factor
    }

    /// Last status seen from the tracker, if one is attached.
    pub fn gesture_status(&self) -> Option<&GestureStatus> {
        self.gesture_status.as_ref().map(|s| s.cached())
    }

    pub fn set_shape(&mut self, shape: Shape) {
        if shape != self.config.shape || self.engine.is_shell() {
            self.config.shape = shape;
            self.engine.set_shape(shape);
        }
    }

    /// Select a shape by name. Unknown names morph to a spherical shell and
    /// leave the configured shape as it was.
    pub fn set_shape_named(&mut self, name: &str) -> Option<Shape> {
        let shape = self.engine.set_shape_named(name);
        if let Some(shape) = shape {
            self.config.shape = shape;
        }
        shape
    }

    pub fn set_particle_count(&mut self, count: usize) -> Result<(), ConfigError> {
        if count == 0 {
            return Err(ConfigError::ZeroParticles);
        }
        self.config.particle_count = count;
        self.engine.resize(count);
        Ok(())
    }

    pub fn set_point_size(&mut self, size: f32) -> Result<(), ConfigError> {
        let next = VisualConfig {
            point_size: size,
            ..self.config.clone()
        };
        next.validate()?;
        self.config = next;
        Ok(())
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) -> Result<(), ConfigError> {
        let next = VisualConfig {
            sensitivity,
            ..self.config.clone()
        };
        next.validate()?;
        self.config = next;
        Ok(())
    }

    pub fn set_pixel_density(&mut self, density: f32) -> Result<(), ConfigError> {
        let next = VisualConfig {
            pixel_density: density,
            ..self.config.clone()
        };
        next.validate()?;
        self.config = next;
        Ok(())
    }

    /// Forget band and beat history, e.g. when playback is stopped.
    pub fn reset_audio(&mut self) {
        self.audio.reset();
        self.last_audio = AudioFrame::default();
    }

    /// Camera off pins the gesture factor at 1.0.
    pub fn set_camera_enabled(&mut self, enabled: bool) {
        self.config.camera_enabled = enabled;
    }

    /// Advance one frame on the wall clock.
    pub fn frame(&mut self, audio: Option<&mut dyn FrequencySource>) -> Frame<'_> {
        let (time, dt) = self.clock.tick();
        self.frame_at(time, dt, audio)
    }

    /// Advance one frame at an explicit time.
    pub fn frame_at(&mut self, time: f32, dt: f32, audio: Option<&mut dyn FrequencySource>) -> Frame<'_> {
        self.last_audio = self.audio.get_frequency_data(audio);
        self.gesture_factor = self.read_gesture();
        self.camera.orbit(dt);

        let params = FrameParams {
            time,
            bands: self.last_audio.bands,
            audio_level: self.last_audio.audio_level,
            gesture: self.gesture_factor,
            sensitivity: self.config.sensitivity,
        };
        let uniforms = RenderUniforms {
            time,
            bands: self.last_audio.bands,
            audio_level: self.last_audio.audio_level,
            gesture: self.gesture_factor,
            palette: self.config.palette,
            point_size: self.config.point_size,
            sensitivity: self.config.sensitivity,
            pixel_density: self.config.pixel_density,
        };
        let view_proj = self.camera.view_proj();
        let particles = self.engine.step(&params);
        Frame {
            particles,
            uniforms,
            view_proj,
        }
    }

    fn read_gesture(&mut self) -> f32 {
        if let Some(status) = self.gesture_status.as_mut() {
            status.latest();
        }
        if !self.config.camera_enabled {
            return OPEN_HAND;
        }
        match self.gesture.as_mut() {
            Some(cell) => *cell.latest().0,
            None => OPEN_HAND,
        }
    }
}
