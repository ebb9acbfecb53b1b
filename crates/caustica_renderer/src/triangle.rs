//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::ray::{Intersection, Ray, EPSILON};
use crate::sampling::uniform_triangle_point;
use crate::surface::{MaterialId, Surface, SurfacePoint};
use caustica_math::Vec3;

/// Determinants below this mean the ray runs parallel to the plane.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Möller-Trumbore ray-triangle intersection.
///
/// Returns `(t, u, v)` where `u` and `v` are the barycentric weights of
/// the second and third vertex. The caller checks `t`.
#[inline]
pub(crate) fn moller_trumbore(
    origin: Vec3,
    direction: Vec3,
    v0: Vec3,
    edge1: Vec3,
    edge2: Vec3,
) -> Option<(f32, f32, f32)> {
    let h = direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < PARALLEL_EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    Some((f * edge2.dot(q), u, v))
}

/// A flat-shaded triangle primitive.
#[derive(Debug, Clone)]
pub struct Triangle {
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    edge1: Vec3,
    edge2: Vec3,
    /// Pre-computed face normal (unit length, counter-clockwise winding)
    normal: Vec3,
    area: f32,
    material: MaterialId,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: MaterialId) -> Self {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let cross = edge1.cross(edge2);

        Self {
            v0,
            v1,
            v2,
            edge1,
            edge2,
            normal: cross.normalize_or_zero(),
            area: 0.5 * cross.length(),
            material,
        }
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Barycentric hit test without touching the ray's hit record.
    pub fn hit_barycentric(&self, ray: &Ray) -> Option<(f32, f32, f32)> {
        if ray.is_degenerate() {
            return None;
        }
        moller_trumbore(ray.origin(), ray.direction(), self.v0, self.edge1, self.edge2)
    }
}

impl Surface for Triangle {
    fn intersect(&self, ray: &mut Ray) -> bool {
        let Some((t, _, _)) = self.hit_barycentric(ray) else {
            return false;
        };
        if t <= EPSILON || !ray.is_closer(t) {
            return false;
        }

        let point = ray.at(t);
        ray.try_install(Intersection {
            point,
            normal: self.normal,
            t,
            material: self.material,
            surface: None,
        })
    }

    fn sample_point(&self, u: f32, v: f32) -> SurfacePoint {
        SurfacePoint {
            position: uniform_triangle_point(self.v0, self.v1, self.v2, u, v),
            normal: self.normal,
        }
    }

    fn area(&self) -> f32 {
        self.area
    }

    fn material(&self) -> MaterialId {
        self.material
    }
}
