// Integration tests for the shape samplers.

use glam::Vec3;
use particle_morph::shapes::{generate, generate_named, generate_with_rng};
use particle_morph::Shape;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn radius_of_gyration(points: &[Vec3]) -> f32 {
    let n = points.len() as f32;
    let centroid = points.iter().copied().sum::<Vec3>() / n;
    (points.iter().map(|p| p.distance_squared(centroid)).sum::<f32>() / n).sqrt()
}

#[test]
fn every_shape_returns_count_finite_bounded_points() {
    let radius = 10.0;
    let mut rng = StdRng::seed_from_u64(7);
    for shape in Shape::ALL {
        let points = generate_with_rng(shape, 2_000, radius, &mut rng);
        assert_eq!(points.len(), 2_000, "{shape} returned the wrong count");
        for p in &points {
            assert!(p.is_finite(), "{shape} produced a non-finite point {p:?}");
            assert!(
                p.length() <= 2.5 * radius + 1e-3,
                "{shape} point {p:?} is far outside the radius"
            );
        }
    }
}

#[test]
fn zero_count_is_empty_for_every_shape() {
    for shape in Shape::ALL {
        assert!(generate(shape, 0, 10.0).is_empty(), "{shape}");
    }
}

#[test]
fn unknown_name_falls_back_to_a_shell() {
    let points = generate_named("dodecahedron", 500, 4.0);
    assert_eq!(points.len(), 500);
    for p in &points {
        assert!((p.length() - 4.0).abs() < 1e-3, "shell point {p:?} off the sphere");
    }
}

#[test]
fn spread_is_stable_between_runs() {
    let radius = 10.0;
    for shape in Shape::ALL {
        let a = radius_of_gyration(&generate_with_rng(shape, 5_000, radius, &mut StdRng::seed_from_u64(1)));
        let b = radius_of_gyration(&generate_with_rng(shape, 5_000, radius, &mut StdRng::seed_from_u64(2)));
        assert!(a > 0.0, "{shape} collapsed to a point");
        assert!(
            (a - b).abs() / a < 0.1,
            "{shape} spread varies too much between runs: {a} vs {b}"
        );
    }
}

#[test]
fn spread_scales_with_radius() {
    for shape in [Shape::Nebula, Shape::Heart, Shape::Saturn, Shape::Rose] {
        let small = radius_of_gyration(&generate_with_rng(shape, 5_000, 5.0, &mut StdRng::seed_from_u64(3)));
        let large = radius_of_gyration(&generate_with_rng(shape, 5_000, 10.0, &mut StdRng::seed_from_u64(3)));
        let ratio = large / small;
        assert!((ratio - 2.0).abs() < 0.1, "{shape} ratio {ratio}");
    }
}

#[test]
fn zero_radius_collapses_to_origin() {
    for shape in Shape::ALL {
        for p in generate(shape, 100, 0.0) {
            assert!(p.length() < 1e-4, "{shape} point {p:?} with zero radius");
        }
    }
}

#[test]
fn names_and_aliases_parse() {
    for shape in Shape::ALL {
        assert_eq!(shape.name().parse::<Shape>(), Ok(shape));
    }
    assert_eq!("Flower".parse::<Shape>(), Ok(Shape::Lotus));
    assert_eq!(" galaxy ".parse::<Shape>(), Ok(Shape::Nebula));
    assert!("cube".parse::<Shape>().is_err());
}

#[test]
fn cycling_visits_every_shape() {
    let mut shape = Shape::default();
    let mut seen = Vec::new();
    for _ in 0..Shape::ALL.len() {
        seen.push(shape);
        shape = shape.next();
    }
    assert_eq!(shape, Shape::default(), "next() should wrap around");
    for s in Shape::ALL {
        assert!(seen.contains(&s));
    }
    assert_eq!(Shape::default().next().prev(), Shape::default());
}

#[test]
fn lotus_height_follows_the_petal_outline() {
    let count = 1_000;
    let radius = 10.0;
    let points = generate_with_rng(Shape::Lotus, count, radius, &mut StdRng::seed_from_u64(3));
    for (i, p) in points.iter().enumerate() {
        let u = i as f32 / count as f32 * std::f32::consts::TAU;
        let outline = (5.0 * u).cos();
        let expected_h = outline * outline * 5.0 - 2.0;
        assert!((p.y - expected_h).abs() < 1e-4, "point {i}: y {} vs {expected_h}", p.y);
        let planar = (p.x * p.x + p.z * p.z).sqrt();
        let r = outline.abs() * radius;
        assert!(planar <= r + 1e-3, "point {i} outside its petal: {planar} > {r}");
        assert!(planar >= 0.3 * r - 1e-3, "point {i} inside the petal core: {planar} < {}", 0.3 * r);
    }
}

#[test]
fn cake_parts_follow_index_thresholds() {
    let count = 1_000;
    let radius = 10.0;
    let eps = 1e-3;
    let points = generate_with_rng(Shape::Cake, count, radius, &mut StdRng::seed_from_u64(9));
    let planar = |p: Vec3| (p.x * p.x + p.z * p.z).sqrt();

    for (i, &p) in points.iter().enumerate() {
        match i {
            // bottom tier
            0..=549 => {
                assert!(p.y >= -5.0 - eps && p.y <= eps, "bottom tier {i}: {p:?}");
                assert!(planar(p) <= 8.0 + eps, "bottom tier {i}: {p:?}");
            }
            // top tier
            550..=899 => {
                assert!(p.y >= -eps && p.y <= 4.0 + eps, "top tier {i}: {p:?}");
                assert!(planar(p) <= 5.0 + eps, "top tier {i}: {p:?}");
            }
            // piping sits on one of the two rims
            900..=949 => {
                let r = planar(p);
                assert!(
                    (r - 8.0).abs() < eps || (r - 5.0).abs() < eps,
                    "piping {i} off both rims: {r}"
                );
            }
            // candle bodies stand on the top tier around a ring of radius 3
            950..=979 => {
                assert!(p.y >= 4.0 - eps && p.y <= 5.5 + eps, "candle {i}: {p:?}");
                assert!((planar(p) - 3.0).abs() <= 0.3 + eps, "candle {i}: {p:?}");
            }
            // flames float above the candles
            _ => {
                assert!(p.y > 5.5, "flame {i}: {p:?}");
                assert!((planar(p) - 3.0).abs() <= 0.3 + eps, "flame {i}: {p:?}");
            }
        }
    }
}
