//! Random sampling helpers shared by the integrator and the photon tracer.

use caustica_math::{Quat, Vec3};
use rand::{Rng, RngCore};
use std::f32::consts::PI;

/// Uniform random number in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Cosine-weighted direction in the hemisphere around `normal`.
///
/// The normal is tilted by the inclination `acos(sqrt(u1))` around a
/// tangent, then spun by the azimuth `2π·u2` around itself.
pub fn cosine_weighted_direction(normal: Vec3, u1: f32, u2: f32) -> Vec3 {
    let inclination = u1.sqrt().acos();
    let azimuth = 2.0 * PI * u2;

    let tangent = normal.any_orthonormal_vector();
    let tilted = Quat::from_axis_angle(tangent, inclination) * normal;
    Quat::from_axis_angle(normal, azimuth) * tilted
}

/// Uniform point on the triangle `abc`.
pub fn uniform_triangle_point(a: Vec3, b: Vec3, c: Vec3, u: f32, v: f32) -> Vec3 {
    let su = u.sqrt();
    a * (1.0 - su) + b * (su * (1.0 - v)) + c * (su * v)
}

/// Uniform direction on the unit sphere.
pub fn uniform_sphere_direction(u: f32, v: f32) -> Vec3 {
    let z = 1.0 - 2.0 * u;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * v;
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Roulette selection over a cumulative distribution.
///
/// Returns the first bucket whose cumulative value exceeds `u`. Values at or
/// past the last entry (rounding) land in the last bucket.
pub fn pick_cumulative(cdf: &[f32], u: f32) -> Option<usize> {
    if cdf.is_empty() {
        return None;
    }
    let i = cdf.partition_point(|&c| c <= u);
    Some(i.min(cdf.len() - 1))
}

/// Normalized running sum of `weights`.
pub fn cumulative(weights: impl IntoIterator<Item = f32>) -> Vec<f32> {
    let mut total = 0.0;
    let mut cdf: Vec<f32> = weights
        .into_iter()
        .map(|w| {
            total += w.max(0.0);
            total
        })
        .collect();

    if total > 0.0 {
        for c in &mut cdf {
            *c /= total;
        }
    }
    cdf
}
