// Integration tests for the morph engine and its displacement passes.

use glam::Vec3;
use particle_morph::morph::{
    breathing, explosion, gesture_scale, gesture_transform, morph_speed, FrameParams, MorphEngine,
};
use particle_morph::spectrum::AudioBands;
use particle_morph::Shape;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn engine(shape: Shape, count: usize) -> MorphEngine {
    MorphEngine::with_rng(shape, count, 10.0, &mut StdRng::seed_from_u64(11))
}

#[test]
fn heart_converges_within_two_hundred_frames() {
    let mut e = engine(Shape::Nebula, 1_000);
    e.set_shape_with_rng(Shape::Heart, &mut StdRng::seed_from_u64(12));
    let start = e.particles().mean_distance_to_target();
    assert!(start > 0.1, "shape change should move the target");

    let params = FrameParams::default();
    let mut last = start;
    for frame in 0..200 {
        e.step(&params);
        let d = e.particles().mean_distance_to_target();
        assert!(d <= last + 1e-5, "distance grew at frame {frame}: {last} -> {d}");
        last = d;
    }
    assert!(last < 0.01 * e.radius(), "still {last} from the heart after 200 frames");
}

#[test]
fn treble_speeds_up_the_morph() {
    let quiet = FrameParams::default();
    let loud = FrameParams {
        bands: AudioBands {
            bass: 0.0,
            mid: 0.0,
            treble: 1.0,
        },
        ..FrameParams::default()
    };
    let mut a = engine(Shape::Nebula, 500);
    let mut b = engine(Shape::Nebula, 500);
    a.set_shape_with_rng(Shape::Saturn, &mut StdRng::seed_from_u64(5));
    b.set_shape_with_rng(Shape::Saturn, &mut StdRng::seed_from_u64(5));
    for _ in 0..10 {
        a.step(&quiet);
        b.step(&loud);
    }
    assert!(b.particles().mean_distance_to_target() < a.particles().mean_distance_to_target());
    assert!((morph_speed(0.0) - 0.03).abs() < 1e-6);
    assert!((morph_speed(1.0) - 0.08).abs() < 1e-6);
}

#[test]
fn step_emits_one_vertex_per_particle() {
    let mut e = engine(Shape::Rose, 300);
    let frame = e.step(&FrameParams::default());
    assert_eq!(frame.len(), 300);
    for v in frame {
        assert!(v.scale >= 0.5 && v.scale <= 1.5);
        assert!(v.seed[..3].iter().all(|s| (0.0..1.0).contains(s)));
    }
}

#[test]
fn resize_rebuilds_the_set_on_target() {
    let mut e = engine(Shape::Spiral, 100);
    e.resize(250);
    assert_eq!(e.len(), 250);
    assert_eq!(e.shape(), Shape::Spiral);
    assert!(e.particles().mean_distance_to_target() < 1e-6);
    assert_eq!(e.step(&FrameParams::default()).len(), 250);
}

#[test]
fn open_hand_scales_by_one_point_nine_without_twist() {
    assert!((gesture_scale(1.0) - 1.9).abs() < 1e-6);
    assert!((gesture_scale(0.0) - 0.1).abs() < 1e-6);
    let p = Vec3::new(3.0, -2.0, 1.0);
    let out = gesture_transform(p, 1.0, 4.2);
    assert!(out.abs_diff_eq(p * 1.9, 1e-5), "{out:?}");
}

#[test]
fn closed_hand_shrinks_and_twists() {
    let p = Vec3::new(2.0, 0.0, 0.0);
    let out = gesture_transform(p, 0.0, 0.0);
    let scaled = p * 0.1;
    // twist keeps the distance to the Z axis
    assert!((out.truncate().length() - scaled.truncate().length()).abs() < 1e-5);
    assert!(!out.truncate().abs_diff_eq(scaled.truncate(), 1e-4), "expected a twist");
}

#[test]
fn breathing_is_small_and_periodic() {
    let p = Vec3::new(1.0, 2.0, 3.0);
    for i in 0..50 {
        let b = breathing(p, i as f32 * 0.7);
        assert!(b.abs().max_element() <= 0.2 + 1e-6);
    }
}

#[test]
fn explosion_is_gated_on_audio_level() {
    let p = Vec3::new(1.0, 1.0, 1.0);
    assert_eq!(explosion(p, 0.005, 1.0, 1.0, 3.0), Vec3::ZERO);
    let calm = explosion(p, 0.8, 0.0, 1.0, 3.0);
    let burst = explosion(p, 0.8, 1.0, 1.0, 3.0);
    // sensitivity scales the outward push, not the shimmer
    let outward = (burst - calm).dot(p.normalize());
    assert!((outward - 0.8 * 5.0).abs() < 1e-4, "push was {outward}");
}

#[test]
fn silent_frame_positions_stay_finite() {
    let mut e = engine(Shape::Koch, 200);
    let params = FrameParams {
        time: 123.4,
        gesture: 0.3,
        ..FrameParams::default()
    };
    for v in e.step(&params) {
        assert!(v.position.iter().all(|c| c.is_finite()));
    }
}

#[test]
fn every_axis_closes_its_gap_without_overshoot() {
    let mut e = engine(Shape::Fireworks, 400);
    e.set_shape_with_rng(Shape::Butterfly, &mut StdRng::seed_from_u64(21));
    let gaps = |e: &MorphEngine| -> Vec<Vec3> {
        let ps = e.particles();
        ps.target().iter().zip(ps.current()).map(|(t, c)| *t - *c).collect()
    };

    let loud = FrameParams {
        bands: AudioBands {
            bass: 0.0,
            mid: 0.0,
            treble: 1.0,
        },
        ..FrameParams::default()
    };
    let quiet = FrameParams::default();
    let mut before = gaps(&e);
    for frame in 0..150 {
        e.step(if frame % 2 == 0 { &loud } else { &quiet });
        let after = gaps(&e);
        for (i, (b, a)) in before.iter().zip(&after).enumerate() {
            for axis in 0..3 {
                let (b, a) = (b[axis], a[axis]);
                assert!(a.abs() <= b.abs() + 1e-6, "particle {i} axis {axis} frame {frame}: {b} -> {a}");
                assert!(
                    a * b >= 0.0 || a.abs() < 1e-6,
                    "particle {i} axis {axis} overshot at frame {frame}: {b} -> {a}"
                );
            }
        }
        before = after;
    }
}

#[test]
fn unknown_shape_name_morphs_to_a_shell() {
    let radius = 10.0;
    let mut e = engine(Shape::Heart, 500);
    let picked = e.set_shape_named_with_rng("dodecahedron", &mut StdRng::seed_from_u64(4));
    assert_eq!(picked, None);
    assert!(e.is_shell());
    assert_eq!(e.shape(), Shape::Heart);
    for t in e.particles().target() {
        assert!((t.length() - radius).abs() < 1e-3, "off the shell: {t:?}");
    }
    // particles flow from the heart rather than jumping
    assert!(e.particles().mean_distance_to_target() > 0.1);

    e.resize(300);
    assert!(e.particles().target().iter().all(|t| (t.length() - radius).abs() < 1e-3));

    assert_eq!(e.set_shape_named("Flower"), Some(Shape::Lotus));
    assert!(!e.is_shell());
    assert_eq!(e.shape(), Shape::Lotus);
}
