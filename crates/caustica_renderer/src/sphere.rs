//! Sphere primitive for ray tracing.

use crate::ray::{Intersection, Ray, EPSILON};
use crate::sampling::uniform_sphere_direction;
use crate::surface::{MaterialId, Surface, SurfacePoint};
use caustica_math::Vec3;
use std::f32::consts::PI;

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: MaterialId,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: MaterialId) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Both roots of `|o + t·d - c|² = r²`, ascending, or `None` when the
    /// ray's line misses the sphere.
    pub fn solve(&self, ray: &Ray) -> Option<(f32, f32)> {
        let oc = ray.origin() - self.center;
        let a = ray.direction().length_squared();
        if a == 0.0 {
            return None;
        }
        let b = 2.0 * ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        let t0 = (-b - sqrtd) / (2.0 * a);
        let t1 = (-b + sqrtd) / (2.0 * a);
        Some((t0.min(t1), t0.max(t1)))
    }
}

impl Surface for Sphere {
    fn intersect(&self, ray: &mut Ray) -> bool {
        let Some((t0, t1)) = self.solve(ray) else {
            return false;
        };

        // Nearest root in front of the origin
        let t = if t0 > EPSILON {
            t0
        } else if t1 > EPSILON {
            t1
        } else {
            return false;
        };

        if !ray.is_closer(t) || self.radius == 0.0 {
            return false;
        }

        let point = ray.at(t);
        ray.try_install(Intersection {
            point,
            normal: (point - self.center) / self.radius,
            t,
            material: self.material,
            surface: None,
        })
    }

    fn sample_point(&self, u: f32, v: f32) -> SurfacePoint {
        let normal = uniform_sphere_direction(u, v);
        SurfacePoint {
            position: self.center + normal * self.radius,
            normal,
        }
    }

    fn area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }

    fn material(&self) -> MaterialId {
        self.material
    }
}
