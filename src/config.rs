//! Session configuration supplied by the front-end.

use crate::constants::*;
use crate::error::ConfigError;
use crate::shapes::Shape;

/// Core, rim and beat-flash colours, linear RGB in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub primary: [f32; 3],
    pub secondary: [f32; 3],
    pub accent: [f32; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY_COLOR,
            secondary: DEFAULT_SECONDARY_COLOR,
            accent: DEFAULT_ACCENT_COLOR,
        }
    }
}

/// Parse `#rrggbb` (leading `#` optional) into `[0, 1]` components.
pub fn parse_hex_color(s: &str) -> Result<[f32; 3], ConfigError> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(ConfigError::BadColor(s.to_string()));
    }
    let mut rgb = [0.0; 3];
    for (i, c) in rgb.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_| ConfigError::BadColor(s.to_string()))?;
        *c = byte as f32 / 255.0;
    }
    Ok(rgb)
}

#[derive(Clone, Debug, PartialEq)]
pub struct VisualConfig {
    pub shape: Shape,
    pub particle_count: usize,
    pub radius: f32,
    pub point_size: f32,
    pub sensitivity: f32,
    pub pixel_density: f32,
    pub palette: Palette,
    /// When false the gesture factor is pinned at 1.0.
    pub camera_enabled: bool,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            shape: Shape::default(),
            particle_count: DEFAULT_PARTICLE_COUNT,
            radius: DEFAULT_RADIUS,
            point_size: DEFAULT_POINT_SIZE,
            sensitivity: DEFAULT_SENSITIVITY,
            pixel_density: DEFAULT_PIXEL_DENSITY,
            palette: Palette::default(),
            camera_enabled: true,
        }
    }
}

impl VisualConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::ZeroParticles);
        }
        positive("radius", self.radius)?;
        positive("point size", self.point_size)?;
        positive("pixel density", self.pixel_density)?;
        // zero sensitivity is a valid "no beat reaction" setting
        if !self.sensitivity.is_finite() || self.sensitivity < 0.0 {
            return Err(ConfigError::NotPositive {
                name: "sensitivity",
                value: self.sensitivity,
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("#ff0000").unwrap(), [1.0, 0.0, 0.0]);
        assert_eq!(parse_hex_color("00ff00").unwrap(), [0.0, 1.0, 0.0]);
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
    }

    #[test]
    fn default_config_is_valid() {
        assert!(VisualConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let mut c = VisualConfig {
            particle_count: 0,
            ..Default::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::ZeroParticles));
        c.particle_count = 10;
        c.radius = f32::NAN;
        assert!(matches!(c.validate(), Err(ConfigError::NotPositive { name: "radius", .. })));
        c.radius = 1.0;
        c.sensitivity = -1.0;
        assert!(c.validate().is_err());
    }
}
