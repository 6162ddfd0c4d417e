//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use particle_morph::config::parse_hex_color;
use particle_morph::{Palette, Shape, VisualConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "morph-native")]
#[command(about = "Audio-reactive particle cloud morphing between 3D shapes", long_about = None)]
pub struct Args {
    /// Initial shape (nebula, heart, lotus, saturn, cake, butterfly, rose, ...).
    /// Unknown names show a spherical shell
    #[arg(long, value_name = "SHAPE", default_value = "nebula")]
    pub shape: String,

    /// Number of particles
    #[arg(long, value_name = "N", default_value_t = particle_morph::constants::DEFAULT_PARTICLE_COUNT)]
    pub count: usize,

    /// Shape radius in world units
    #[arg(long, default_value_t = particle_morph::constants::DEFAULT_RADIUS)]
    pub radius: f32,

    /// Base point size
    #[arg(long, default_value_t = particle_morph::constants::DEFAULT_POINT_SIZE)]
    pub size: f32,

    /// Beat reaction strength
    #[arg(long, default_value_t = particle_morph::constants::DEFAULT_SENSITIVITY)]
    pub sensitivity: f32,

    /// Core colour, #rrggbb
    #[arg(long, value_name = "HEX")]
    pub primary: Option<String>,

    /// Rim colour, #rrggbb
    #[arg(long, value_name = "HEX")]
    pub secondary: Option<String>,

    /// Beat flash colour, #rrggbb
    #[arg(long, value_name = "HEX")]
    pub accent: Option<String>,

    /// WAV file to play and analyse
    #[arg(long, value_name = "FILE")]
    pub audio: Option<PathBuf>,

    /// Start with hand tracking off (gesture factor stays at 1.0)
    #[arg(long)]
    pub no_camera: bool,

    /// Start playback as soon as the file is loaded
    #[arg(long)]
    pub autoplay: bool,
}

impl Args {
    /// Build and validate the session configuration.
    pub fn visual_config(&self) -> anyhow::Result<VisualConfig> {
        // an unknown name is applied later through `unknown_shape`
        let shape = self.shape.parse::<Shape>().unwrap_or_default();
        let mut palette = Palette::default();
        if let Some(hex) = &self.primary {
            palette.primary = parse_hex_color(hex)?;
        }
        if let Some(hex) = &self.secondary {
            palette.secondary = parse_hex_color(hex)?;
        }
        if let Some(hex) = &self.accent {
            palette.accent = parse_hex_color(hex)?;
        }
        let config = VisualConfig {
            shape,
            particle_count: self.count,
            radius: self.radius,
            point_size: self.size,
            sensitivity: self.sensitivity,
            palette,
            camera_enabled: !self.no_camera,
            ..VisualConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// The `--shape` value when it names no known shape.
    pub fn unknown_shape(&self) -> Option<&str> {
        match self.shape.parse::<Shape>() {
            Ok(_) => None,
            Err(_) => Some(&self.shape),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_shape_names_parse_with_aliases() {
        let args = Args::parse_from(["morph-native", "--shape", "Flower", "--no-camera"]);
        let config = args.visual_config().unwrap();
        assert_eq!(config.shape, Shape::Lotus);
        assert!(!config.camera_enabled);
        assert_eq!(args.unknown_shape(), None);
    }

    #[test]
    fn unknown_shape_is_kept_for_the_shell_fallback() {
        let args = Args::parse_from(["morph-native", "--shape", "dodecahedron"]);
        assert!(args.visual_config().is_ok());
        assert_eq!(args.unknown_shape(), Some("dodecahedron"));
    }

    #[test]
    fn bad_colour_is_an_error() {
        let args = Args::parse_from(["morph-native", "--primary", "#zz0000"]);
        assert!(args.visual_config().is_err());
    }
}
