//! Procedural target geometry for the particle cloud.
//!
//! Every shape is a pure sampler: given a particle index, the particle count and
//! a scale radius it returns one position. [`generate`] maps the sampler over
//! all indices. Samplers draw from the RNG they are handed and keep no state
//! between calls, so two calls for the same shape give different points with
//! the same overall form.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_6, PI, TAU};
use std::fmt;
use std::str::FromStr;

use glam::{Quat, Vec3};
use rand::Rng;

use crate::constants::*;
use crate::error::ShapeParseError;

/// One of the thirteen target geometries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Shape {
    #[default]
    Nebula,
    Heart,
    Lotus,
    Saturn,
    Cake,
    Fireworks,
    Spiral,
    Lemniscate,
    Koch,
    Astroid,
    Butterfly,
    Catenoid,
    Rose,
}

impl Shape {
    pub const ALL: [Shape; 13] = [
        Shape::Nebula,
        Shape::Heart,
        Shape::Lotus,
        Shape::Saturn,
        Shape::Cake,
        Shape::Fireworks,
        Shape::Spiral,
        Shape::Lemniscate,
        Shape::Koch,
        Shape::Astroid,
        Shape::Butterfly,
        Shape::Catenoid,
        Shape::Rose,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Shape::Nebula => "nebula",
            Shape::Heart => "heart",
            Shape::Lotus => "lotus",
            Shape::Saturn => "saturn",
            Shape::Cake => "cake",
            Shape::Fireworks => "fireworks",
            Shape::Spiral => "spiral",
            Shape::Lemniscate => "lemniscate",
            Shape::Koch => "koch",
            Shape::Astroid => "astroid",
            Shape::Butterfly => "butterfly",
            Shape::Catenoid => "catenoid",
            Shape::Rose => "rose",
        }
    }

    fn index(self) -> usize {
        Shape::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    /// Next shape in menu order, wrapping around.
    pub fn next(self) -> Shape {
        Shape::ALL[(self.index() + 1) % Shape::ALL.len()]
    }

    /// Previous shape in menu order, wrapping around.
    pub fn prev(self) -> Shape {
        let n = Shape::ALL.len();
        Shape::ALL[(self.index() + n - 1) % n]
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Shape {
    type Err = ShapeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let shape = match key.as_str() {
            "nebula" | "galaxy" => Shape::Nebula,
            "heart" => Shape::Heart,
            "lotus" | "flower" => Shape::Lotus,
            "saturn" | "planet" => Shape::Saturn,
            "cake" => Shape::Cake,
            "fireworks" | "firework" => Shape::Fireworks,
            "spiral" | "archimedean" => Shape::Spiral,
            "lemniscate" | "infinity" => Shape::Lemniscate,
            "koch" | "fractal" => Shape::Koch,
            "astroid" => Shape::Astroid,
            "butterfly" => Shape::Butterfly,
            "catenoid" => Shape::Catenoid,
            "rose" | "rose3d" => Shape::Rose,
            _ => return Err(ShapeParseError(s.to_string())),
        };
        Ok(shape)
    }
}

/// Generate `count` target positions for `shape` using the thread RNG.
pub fn generate(shape: Shape, count: usize, radius: f32) -> Vec<Vec3> {
    generate_with_rng(shape, count, radius, &mut rand::thread_rng())
}

/// Generate target positions drawing all randomness from `rng`.
pub fn generate_with_rng<R: Rng + ?Sized>(
    shape: Shape,
    count: usize,
    radius: f32,
    rng: &mut R,
) -> Vec<Vec3> {
    let radius = sanitize_radius(radius);
    (0..count)
        .map(|i| {
            let t = i as f32 / count as f32;
            let p = sample(shape, i, t, radius, rng);
            bound(p, radius)
        })
        .collect()
}

/// Generate by shape name. Unknown names fall back to a spherical shell.
pub fn generate_named(name: &str, count: usize, radius: f32) -> Vec<Vec3> {
    match name.parse::<Shape>() {
        Ok(shape) => generate(shape, count, radius),
        Err(e) => {
            log::warn!("{e}, sampling a spherical shell instead");
            generate_shell_with_rng(count, radius, &mut rand::thread_rng())
        }
    }
}

/// `count` points spread uniformly over a sphere of `radius`.
pub fn generate_shell_with_rng<R: Rng + ?Sized>(count: usize, radius: f32, rng: &mut R) -> Vec<Vec3> {
    let radius = sanitize_radius(radius);
    (0..count)
        .map(|_| bound(sphere_shell(radius, rng), radius))
        .collect()
}

fn sanitize_radius(radius: f32) -> f32 {
    if radius.is_finite() {
        radius.abs()
    } else {
        0.0
    }
}

/// Drop non-finite points to the origin and pull outliers back inside
/// `SHAPE_MAGNITUDE_LIMIT * radius`.
fn bound(p: Vec3, radius: f32) -> Vec3 {
    if !p.is_finite() {
        return Vec3::ZERO;
    }
    let limit = SHAPE_MAGNITUDE_LIMIT * radius;
    let len = p.length();
    if len > limit {
        p * (limit / len)
    } else {
        p
    }
}

fn sample<R: Rng + ?Sized>(shape: Shape, i: usize, t: f32, radius: f32, rng: &mut R) -> Vec3 {
    match shape {
        Shape::Nebula => nebula(radius, rng),
        Shape::Heart => heart(radius, rng),
        Shape::Lotus => lotus(t, radius, rng),
        Shape::Saturn => saturn(t, radius, rng),
        Shape::Cake => cake(i, t, radius, rng),
        Shape::Fireworks => fireworks(radius, rng),
        Shape::Spiral => spiral(t, radius, rng),
        Shape::Lemniscate => lemniscate(t, radius, rng),
        Shape::Koch => koch(radius, rng),
        Shape::Astroid => astroid(radius, rng),
        Shape::Butterfly => butterfly(t, radius, rng),
        Shape::Catenoid => catenoid(t, radius, rng),
        Shape::Rose => rose(radius, rng),
    }
}

// ========== Sampling primitives ==========

/// Uniform direction on the unit sphere.
fn unit_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let theta = rng.gen_range(0.0..TAU);
    let cos_phi: f32 = rng.gen_range(-1.0..1.0);
    let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
    Vec3::new(sin_phi * theta.cos(), sin_phi * theta.sin(), cos_phi)
}

/// Uniform point inside a ball.
fn solid_sphere<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Vec3 {
    unit_direction(rng) * radius * rng.gen::<f32>().cbrt()
}

/// Uniform point on a sphere surface. Also the fallback for unknown shapes.
pub fn sphere_shell<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Vec3 {
    unit_direction(rng) * radius
}

/// Uniform point inside a vertical cylinder spanning `y0..y1`.
fn solid_cylinder<R: Rng + ?Sized>(radius: f32, y0: f32, y1: f32, rng: &mut R) -> Vec3 {
    let a = rng.gen_range(0.0..TAU);
    let r = radius * rng.gen::<f32>().sqrt();
    let y = y0 + (y1 - y0) * rng.gen::<f32>();
    Vec3::new(r * a.cos(), y, r * a.sin())
}

/// Symmetric jitter in `[-amount, amount)`.
fn jitter<R: Rng + ?Sized>(amount: f32, rng: &mut R) -> f32 {
    (rng.gen::<f32>() * 2.0 - 1.0) * amount
}

// ========== Shapes ==========

fn nebula<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Vec3 {
    let p = solid_sphere(radius, rng);
    let swirl = (p.length() * 0.5).sin();
    let (s, c) = swirl.sin_cos();
    Vec3::new(p.x * c - p.z * s, p.y * 0.3, p.x * s + p.z * c)
}

fn heart<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Vec3 {
    let u = rng.gen_range(0.0..TAU);
    let x = 16.0 * u.sin().powi(3);
    let y = 13.0 * u.cos() - 5.0 * (2.0 * u).cos() - 2.0 * (3.0 * u).cos() - (4.0 * u).cos();
    let s = radius / 16.0;
    let z = jitter(radius * 0.3, rng) * u.sin();
    Vec3::new(x * s, y * s, z)
}

fn lotus<R: Rng + ?Sized>(t: f32, radius: f32, rng: &mut R) -> Vec3 {
    let u = t * TAU;
    let r = (5.0 * u).cos() * radius;
    let h = (r.abs() / radius.max(f32::EPSILON)).powi(2) * 5.0 - 2.0;
    // fill the petal in the plane only; height follows the outline
    let planar = r * (0.3 + 0.7 * rng.gen::<f32>().sqrt());
    Vec3::new(planar * u.cos(), h, planar * u.sin())
}

fn saturn<R: Rng + ?Sized>(t: f32, radius: f32, rng: &mut R) -> Vec3 {
    if t < 0.4 {
        return solid_sphere(radius * 0.6, rng);
    }
    let a = rng.gen_range(0.0..TAU);
    let dist = radius * rng.gen_range(1.2..2.0);
    let flat = Vec3::new(dist * a.cos(), jitter(radius * 0.01, rng), dist * a.sin());
    Quat::from_rotation_x(FRAC_PI_6) * flat
}

fn cake<R: Rng + ?Sized>(i: usize, t: f32, radius: f32, rng: &mut R) -> Vec3 {
    let bottom_r = radius * 0.8;
    let top_r = radius * 0.5;
    let base_y = -radius * 0.5;
    let tier_y = 0.0;
    let top_y = radius * 0.4;
    let candle_top = radius * 0.55;

    if t < CAKE_TIER_FRACTION {
        solid_cylinder(bottom_r, base_y, tier_y, rng)
    } else if t < CAKE_PIPING_FRACTION {
        solid_cylinder(top_r, tier_y, top_y, rng)
    } else if t < CAKE_CANDLE_FRACTION {
        // alternate between the rim of each tier
        let (rim_r, rim_y) = if i % 2 == 0 {
            (bottom_r, tier_y)
        } else {
            (top_r, top_y)
        };
        let a = rng.gen_range(0.0..TAU);
        let wave = (a * CAKE_PIPING_WAVES).sin() * radius * 0.04;
        Vec3::new(rim_r * a.cos(), rim_y + wave, rim_r * a.sin())
    } else {
        let k = i % CAKE_CANDLE_COUNT;
        let a = k as f32 * TAU / CAKE_CANDLE_COUNT as f32;
        let center = Vec3::new(a.cos(), 0.0, a.sin()) * (top_r * 0.6);
        if t < CAKE_FLAME_FRACTION {
            let body = solid_cylinder(radius * 0.03, top_y, candle_top, rng);
            center + body
        } else {
            let flame = Vec3::new(
                jitter(radius * 0.02, rng),
                candle_top + radius * 0.04 + jitter(radius * 0.03, rng).abs(),
                jitter(radius * 0.02, rng),
            );
            center + flame
        }
    }
}

fn fireworks<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Vec3 {
    unit_direction(rng) * radius * rng.gen::<f32>().powf(0.1)
}

fn spiral<R: Rng + ?Sized>(t: f32, radius: f32, rng: &mut R) -> Vec3 {
    const LOOPS: f32 = 4.0;
    let theta = t * TAU * LOOPS;
    let r = theta / (TAU * LOOPS) * radius * 1.5;
    let scatter = radius * 0.08;
    Vec3::new(
        r * theta.cos() + jitter(scatter, rng),
        jitter(radius * 0.05, rng),
        r * theta.sin() + jitter(scatter, rng),
    )
}

fn lemniscate<R: Rng + ?Sized>(t: f32, radius: f32, rng: &mut R) -> Vec3 {
    let u = t * TAU;
    let a = radius * 1.2;
    let d = 1.0 + u.sin() * u.sin();
    let x = a * u.cos() / d + jitter(radius * 0.03, rng);
    let y = a * u.sin() * u.cos() / d + jitter(radius * 0.03, rng);
    let z = jitter(radius * 0.1, rng);
    Quat::from_rotation_x(FRAC_PI_2) * Vec3::new(x, y, z)
}

fn koch<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Vec3 {
    const DEPTH: usize = 6;
    const ATTRACTORS: [Vec3; 4] = [
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
    ];
    let mut p = Vec3::new(jitter(1.0, rng), jitter(1.0, rng), jitter(1.0, rng));
    for _ in 0..DEPTH {
        let v = ATTRACTORS[rng.gen_range(0..ATTRACTORS.len())];
        p = (p + v) * 0.5;
    }
    p * radius
}

fn astroid<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Vec3 {
    let r = radius * 1.2;
    let u = rng.gen_range(0.0..TAU);
    let v = rng.gen_range(-FRAC_PI_2..FRAC_PI_2);
    let cv = v.cos().powi(3);
    Vec3::new(
        r * u.cos().powi(3) * cv,
        r * v.sin().powi(3),
        r * u.sin().powi(3) * cv,
    )
}

fn butterfly<R: Rng + ?Sized>(t: f32, radius: f32, rng: &mut R) -> Vec3 {
    const LOOPS: f32 = 12.0;
    let theta = t * TAU * LOOPS;
    let r = theta.cos().exp() - 2.0 * (4.0 * theta).cos() - (theta / 12.0).sin().powi(5);
    let s = radius * 0.3;
    Vec3::new(
        r * theta.sin() * s,
        r * theta.cos() * s,
        jitter(r.abs() * radius * 0.05, rng),
    )
}

fn catenoid<R: Rng + ?Sized>(t: f32, radius: f32, rng: &mut R) -> Vec3 {
    let c = (radius * 0.3).max(f32::EPSILON);
    let half_height = radius * 0.6;
    let v = (t * 2.0 - 1.0) * half_height;
    let u = rng.gen_range(0.0..TAU);
    let w = c * (v / c).cosh();
    Vec3::new(w * u.cos(), v, w * u.sin())
}

fn rose<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Vec3 {
    const K: f32 = 6.0;
    let theta = rng.gen_range(0.0..TAU);
    let phi = rng.gen_range(0.0..PI);
    let petal = ((K * theta).sin() * (K * phi).sin()).abs();
    let r = radius * (0.3 + 0.7 * petal);
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.cos(),
        r * phi.sin() * theta.sin(),
    )
}
