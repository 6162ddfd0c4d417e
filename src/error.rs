//! Error types for configuration, shape parsing and hand tracking.
//!
//! Nothing here is raised from the per-frame path: frame updates degrade to
//! defaults instead of failing. These errors surface at the configuration
//! boundary and as persistent tracking status.

use thiserror::Error;

/// Invalid session configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("particle count must be greater than zero")]
    ZeroParticles,
    #[error("{name} must be a finite positive number, got {value}")]
    NotPositive { name: &'static str, value: f32 },
    #[error("invalid color {0:?}, expected #rrggbb")]
    BadColor(String),
}

/// Unknown shape name passed to the strict parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown shape {0:?}")]
pub struct ShapeParseError(pub String);

/// Why hand tracking is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GestureError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("camera not supported on this device")]
    Unsupported,
    #[error("hand model unavailable: {0}")]
    ModelUnavailable(String),
}

impl GestureError {
    /// Only a missing model is worth retrying; device failures are final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GestureError::ModelUnavailable(_))
    }
}
