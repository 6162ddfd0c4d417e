pub mod analyser;
pub mod audio;
pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
pub mod gesture;
pub mod morph;
pub mod particles;
pub mod shading;
pub mod shapes;
pub mod signal;
pub mod spectrum;
pub mod state;
pub mod uniforms;

pub static PARTICLES_WGSL: &str = include_str!("../shaders/particles.wgsl");

pub use audio::{AudioFrame, AudioSession, FrequencySource};
pub use config::{Palette, VisualConfig};
pub use error::{ConfigError, GestureError, ShapeParseError};
pub use frame::{Frame, Visualizer};
pub use gesture::{GestureMapper, GestureStatus, GestureTracker, LandmarkPoll, LandmarkSource};
pub use morph::{FrameParams, MorphEngine, ParticleVertex};
pub use shapes::Shape;
pub use spectrum::{AudioBands, SpectrumAnalyzer};
pub use state::Camera;
pub use uniforms::{GpuUniforms, RenderUniforms};
