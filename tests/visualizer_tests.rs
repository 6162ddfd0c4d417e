// Frame orchestration: config, gesture cells, audio decay and uniforms.

use std::time::Duration;

use particle_morph::gesture::{spawn_tracker, GestureStatus, LandmarkPoll, LandmarkSource};
use particle_morph::signal::publish_cell;
use particle_morph::{
    ConfigError, GestureError, GestureTracker, Palette, Shape, Visualizer, VisualConfig,
};

fn small_config() -> VisualConfig {
    VisualConfig {
        particle_count: 400,
        ..VisualConfig::default()
    }
}

#[test]
fn frame_without_inputs_uses_open_hand_and_silence() {
    let mut vis = Visualizer::new(small_config()).unwrap();
    let frame = vis.frame_at(0.5, 1.0 / 60.0, None);
    assert_eq!(frame.particles.len(), 400);
    assert_eq!(frame.uniforms.gesture, 1.0);
    assert_eq!(frame.uniforms.audio_level, 0.0);
    assert_eq!(frame.uniforms.time, 0.5);
    assert_eq!(frame.uniforms.palette, Palette::default());
}

#[test]
fn invalid_config_is_rejected() {
    let bad = VisualConfig {
        radius: -1.0,
        ..small_config()
    };
    assert!(matches!(
        Visualizer::new(bad),
        Err(ConfigError::NotPositive { name: "radius", .. })
    ));
    let mut vis = Visualizer::new(small_config()).unwrap();
    assert_eq!(vis.set_particle_count(0), Err(ConfigError::ZeroParticles));
    assert!(vis.set_point_size(f32::NAN).is_err());
    assert_eq!(vis.config().point_size, VisualConfig::default().point_size);
}

#[test]
fn gesture_cell_drives_the_frame_until_camera_is_off() {
    let mut vis = Visualizer::new(small_config()).unwrap();
    let (factor_tx, factor_rx) = publish_cell(1.0f32);
    let (_status_tx, status_rx) = publish_cell(GestureStatus::Initializing);
    vis.attach_gesture(factor_rx, status_rx);

    factor_tx.publish(0.25);
    let frame = vis.frame_at(0.0, 0.0, None);
    assert_eq!(frame.uniforms.gesture, 0.25);

    vis.set_camera_enabled(false);
    let frame = vis.frame_at(0.1, 0.0, None);
    assert_eq!(frame.uniforms.gesture, 1.0);
}

#[test]
fn shape_and_count_changes_reach_the_engine() {
    let mut vis = Visualizer::new(small_config()).unwrap();
    vis.set_shape(Shape::Butterfly);
    assert_eq!(vis.engine().shape(), Shape::Butterfly);
    vis.set_particle_count(900).unwrap();
    assert_eq!(vis.frame_at(1.0, 0.016, None).particles.len(), 900);
}

#[test]
fn camera_orbits_between_frames() {
    let mut vis = Visualizer::new(small_config()).unwrap();
    let before = vis.camera().eye;
    vis.frame_at(0.0, 2.0, None);
    assert_ne!(vis.camera().eye, before);
}

struct Denied;

impl LandmarkSource for Denied {
    fn load(&mut self) -> Result<(), GestureError> {
        Err(GestureError::PermissionDenied)
    }

    fn poll(&mut self) -> Result<LandmarkPoll, GestureError> {
        Ok(LandmarkPoll::Pending)
    }
}

#[test]
fn background_tracker_publishes_its_status() {
    let mut feed = spawn_tracker(GestureTracker::new(Denied), Duration::from_millis(1)).unwrap();
    let mut status = feed.status.get();
    for _ in 0..500 {
        if status != GestureStatus::Initializing {
            break;
        }
        std::thread::sleep(Duration::from_millis(2));
        status = feed.status.get();
    }
    assert_eq!(status, GestureStatus::Error(GestureError::PermissionDenied));
    assert_eq!(feed.factor.get(), 1.0);
}

struct SilentTrack;

impl particle_morph::FrequencySource for SilentTrack {
    fn is_active(&self) -> bool {
        true
    }

    fn recent_samples(&mut self, out: &mut Vec<f32>) -> bool {
        out.clear();
        out.resize(512, 0.0);
        true
    }
}

#[test]
fn silent_track_heart_settles_in_two_hundred_frames() {
    let mut vis = Visualizer::new(VisualConfig {
        particle_count: 1_000,
        radius: 10.0,
        ..VisualConfig::default()
    })
    .unwrap();
    vis.set_shape(Shape::Heart);
    let mut track = SilentTrack;
    for i in 0..200 {
        let frame = vis.frame_at(i as f32 / 60.0, 1.0 / 60.0, Some(&mut track));
        assert_eq!(frame.uniforms.audio_level, 0.0);
    }
    let d = vis.engine().particles().mean_distance_to_target();
    assert!(d < 0.1, "mean distance {d} after 200 frames");
}

#[test]
fn unknown_shape_name_targets_a_shell_and_keeps_the_config() {
    let mut vis = Visualizer::new(small_config()).unwrap();
    assert_eq!(vis.set_shape_named("dodecahedron"), None);
    assert!(vis.engine().is_shell());
    assert_eq!(vis.config().shape, Shape::default());

    // picking the configured shape again leaves the shell
    vis.set_shape(Shape::default());
    assert!(!vis.engine().is_shell());
    assert_eq!(vis.set_shape_named("planet"), Some(Shape::Saturn));
    assert_eq!(vis.config().shape, Shape::Saturn);
}

#[test]
fn pixel_density_and_sensitivity_reach_the_uniforms() {
    let mut vis = Visualizer::new(small_config()).unwrap();
    vis.set_pixel_density(2.0).unwrap();
    vis.set_sensitivity(0.0).unwrap();
    let frame = vis.frame_at(0.0, 0.0, None);
    assert_eq!(frame.uniforms.pixel_density, 2.0);
    assert_eq!(frame.uniforms.sensitivity, 0.0);

    let base = particle_morph::shading::point_size(0.35, 1.0, 1.0, 0.0, 10.0);
    let hidpi = particle_morph::shading::point_size(0.35, 1.0, 2.0, 0.0, 10.0);
    assert!((hidpi / base - 2.0).abs() < 1e-5);

    assert!(vis.set_pixel_density(0.0).is_err());
    assert!(vis.set_sensitivity(-1.0).is_err());
    assert_eq!(vis.config().pixel_density, 2.0);
}

#[test]
fn reset_audio_silences_the_next_frame() {
    let mut vis = Visualizer::new(small_config()).unwrap();
    let mut tone = LoudBass;
    let loud = vis.frame_at(0.0, 0.0, Some(&mut tone)).uniforms;
    assert!(loud.bands.bass > 0.0);
    vis.reset_audio();
    let after = vis.frame_at(0.1, 0.0, None).uniforms;
    assert_eq!(after.bands, particle_morph::AudioBands::SILENT);
    assert_eq!(after.audio_level, 0.0);
}

struct LoudBass;

impl particle_morph::FrequencySource for LoudBass {
    fn is_active(&self) -> bool {
        true
    }

    fn recent_samples(&mut self, out: &mut Vec<f32>) -> bool {
        out.clear();
        out.extend((0..512).map(|n| (std::f32::consts::TAU * 4.0 * n as f32 / 512.0).sin()));
        true
    }
}
