//! Rays with closest-hit bookkeeping and secondary ray derivation.

use crate::material::{Material, MaterialKind};
use crate::sampling::cosine_weighted_direction;
use crate::surface::{MaterialId, SurfaceId};
use caustica_math::Vec3;

/// Hits closer than this are treated as self-intersections.
pub const EPSILON: f32 = 1e-5;

/// Distance secondary rays start above (or below) the surface they leave.
pub const SURFACE_OFFSET: f32 = 1e-4;

/// Record of where a ray hit a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub point: Vec3,
    /// Unit normal as stored on the surface (not flipped towards the ray)
    pub normal: Vec3,
    pub t: f32,
    pub material: MaterialId,
    /// Set by the scene once it knows which surface produced the hit
    pub surface: Option<SurfaceId>,
}

/// A ray and the nearest hit found for it so far.
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    hit: Option<Intersection>,
    reflection_coefficient: f32,
    refraction_index: f32,
}

/// Rays leaving a transparent surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Transmission {
    pub reflected: Ray,
    /// `None` under total internal reflection
    pub refracted: Option<Ray>,
}

impl Ray {
    /// Create a ray in air. The direction is normalized; a zero direction
    /// stays zero and never hits anything.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            hit: None,
            reflection_coefficient: 1.0,
            refraction_index: 1.0,
        }
    }

    fn derived(origin: Vec3, direction: Vec3, refraction_index: f32, coefficient: f32) -> Self {
        Self {
            refraction_index,
            reflection_coefficient: coefficient,
            ..Self::new(origin, direction)
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn hit(&self) -> Option<&Intersection> {
        self.hit.as_ref()
    }

    /// Weight of this ray in the Fresnel split that produced it.
    pub fn reflection_coefficient(&self) -> f32 {
        self.reflection_coefficient
    }

    /// Refraction index of the medium the ray travels through.
    pub fn refraction_index(&self) -> f32 {
        self.refraction_index
    }

    /// Get the point along the ray at parameter t.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    pub fn is_degenerate(&self) -> bool {
        self.direction == Vec3::ZERO
    }

    /// Distance to the installed hit, or infinity.
    pub fn nearest_t(&self) -> f32 {
        self.hit.map_or(f32::INFINITY, |h| h.t)
    }

    /// Would a hit at `t` replace the installed one?
    pub fn is_closer(&self, t: f32) -> bool {
        t > EPSILON && t < self.nearest_t()
    }

    /// Install `hit` if it is nearer than the current one.
    pub fn try_install(&mut self, hit: Intersection) -> bool {
        if self.is_closer(hit.t) {
            self.hit = Some(hit);
            true
        } else {
            false
        }
    }

    pub(crate) fn stamp_surface(&mut self, id: SurfaceId) {
        if let Some(hit) = &mut self.hit {
            hit.surface = Some(id);
        }
    }

    pub fn to_math_ray(&self) -> caustica_math::Ray {
        caustica_math::Ray::new(self.origin, self.direction)
    }

    /// Hit normal flipped to face the side the ray came from.
    pub fn facing_normal(&self) -> Option<Vec3> {
        let hit = self.hit.as_ref()?;
        if hit.normal.dot(self.direction) > 0.0 {
            Some(-hit.normal)
        } else {
            Some(hit.normal)
        }
    }

    /// Secondary ray leaving the hit on the incoming side.
    ///
    /// Specular materials mirror the direction; every other material draws a
    /// cosine-weighted direction from `u1`, `u2`.
    pub fn reflected_ray(&self, material: &Material, u1: f32, u2: f32) -> Option<Ray> {
        let hit = self.hit.as_ref()?;
        let normal = self.facing_normal()?;

        let direction = match material.kind() {
            MaterialKind::PerfectReflector | MaterialKind::Transparent => {
                reflect(self.direction, normal)
            }
            _ => cosine_weighted_direction(normal, u1, u2),
        };

        Some(Self::derived(
            hit.point + normal * SURFACE_OFFSET,
            direction,
            self.refraction_index,
            1.0,
        ))
    }

    /// Reflected and refracted rays at a transparent hit, weighted by
    /// Schlick's approximation of the Fresnel reflectance.
    pub fn refracted_ray(&self, material: &Material) -> Option<Transmission> {
        let hit = self.hit.as_ref()?;
        let d = self.direction;

        let (n1, n2, normal) = if hit.normal.dot(d) > 0.0 {
            (material.refraction_index(), 1.0, -hit.normal)
        } else {
            (1.0, material.refraction_index(), hit.normal)
        };

        let reflected_origin = hit.point + normal * SURFACE_OFFSET;
        let reflected_direction = reflect(d, normal);

        let Some((direction, cos_t)) = refract(d, normal, n1 / n2) else {
            return Some(Transmission {
                reflected: Self::derived(reflected_origin, reflected_direction, n1, 1.0),
                refracted: None,
            });
        };

        let cos_i = -normal.dot(d);
        let cosine = if n1 > n2 { cos_t } else { cos_i };
        let reflectance = schlick(cosine, n1, n2);

        Some(Transmission {
            reflected: Self::derived(reflected_origin, reflected_direction, n1, reflectance),
            refracted: Some(Self::derived(
                hit.point - normal * SURFACE_OFFSET,
                direction,
                n2,
                1.0 - reflectance,
            )),
        })
    }

    /// Ray from the hit towards `target`, used for visibility tests.
    pub fn shadow_ray(&self, target: Vec3) -> Option<Ray> {
        let hit = self.hit.as_ref()?;
        let normal = self.facing_normal()?;
        let origin = hit.point + normal * SURFACE_OFFSET;
        Some(Self::new(origin, target - origin))
    }
}

/// Mirror `v` about `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Snell refraction of unit `d` through a surface with unit normal `n`
/// facing against `d`, with `eta = n1 / n2`.
///
/// Returns the refracted direction and the cosine of the transmitted angle,
/// or `None` on total internal reflection.
pub fn refract(d: Vec3, n: Vec3, eta: f32) -> Option<(Vec3, f32)> {
    let cos_i = -n.dot(d);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return None;
    }
    let cos_t = k.sqrt();
    Some((eta * d + (eta * cos_i - cos_t) * n, cos_t))
}

/// Schlick's approximation of Fresnel reflectance.
#[inline]
pub fn schlick(cosine: f32, n1: f32, n2: f32) -> f32 {
    let r0 = ((n1 - n2) / (n1 + n2)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Color;

    fn hit_at(point: Vec3, normal: Vec3, t: f32) -> Intersection {
        Intersection {
            point,
            normal,
            t,
            material: MaterialId(0),
            surface: None,
        }
    }

    #[test]
    fn test_new_normalizes_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 3.0, 4.0));
        assert!((ray.direction().length() - 1.0).abs() < 1e-6);
        assert!(!ray.is_degenerate());

        let zero = Ray::new(Vec3::ONE, Vec3::ZERO);
        assert!(zero.is_degenerate());
        assert_eq!(zero.nearest_t(), f32::INFINITY);
    }

    #[test]
    fn test_closest_hit_any_order() {
        let candidates = [3.0, 1.0, 2.0, 0.5, 4.0];
        let mut ray = Ray::new(Vec3::ZERO, Vec3::X);

        let mut previous = f32::INFINITY;
        for t in candidates {
            ray.try_install(hit_at(ray.at(t), Vec3::NEG_X, t));
            assert!(ray.nearest_t() <= previous);
            previous = ray.nearest_t();
        }
        assert_eq!(ray.nearest_t(), 0.5);

        // Too close to the origin
        assert!(!ray.try_install(hit_at(Vec3::ZERO, Vec3::NEG_X, EPSILON / 2.0)));
        assert_eq!(ray.nearest_t(), 0.5);
    }

    #[test]
    fn test_derivations_need_a_hit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let m = Material::lambertian(Color::ONE);
        assert!(ray.reflected_ray(&m, 0.5, 0.5).is_none());
        assert!(ray.refracted_ray(&Material::transparent(1.5)).is_none());
        assert!(ray.shadow_ray(Vec3::Y).is_none());
        assert!(ray.facing_normal().is_none());
    }

    #[test]
    fn test_mirror_reflection() {
        let mut ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        ray.try_install(hit_at(Vec3::ZERO, Vec3::Y, 2.0_f32.sqrt()));

        let mirror = Material::perfect_reflector(Color::ONE);
        let reflected = ray.reflected_ray(&mirror, 0.0, 0.0).unwrap();
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((reflected.direction() - expected).length() < 1e-5);
        assert!(reflected.origin().y > 0.0);
    }

    #[test]
    fn test_diffuse_reflection_stays_on_incoming_side() {
        // Hit from below a surface whose stored normal points up
        let mut ray = Ray::new(Vec3::new(0.0, -1.0, 0.0), Vec3::Y);
        ray.try_install(hit_at(Vec3::ZERO, Vec3::Y, 1.0));
        assert_eq!(ray.facing_normal(), Some(Vec3::NEG_Y));

        let m = Material::lambertian(Color::ONE);
        for i in 0..10 {
            let u = i as f32 / 10.0;
            let bounce = ray.reflected_ray(&m, u, 1.0 - u).unwrap();
            assert!(bounce.direction().y <= 1e-4);
            assert!(bounce.origin().y < 0.0);
        }
    }

    #[test]
    fn test_slab_refraction_round_trip() {
        let glass = Material::transparent(1.5);
        let d = Vec3::new(0.6, -0.8, 0.0);

        // Enter the top face of a slab (outward normal +Y)
        let mut entering = Ray::new(Vec3::new(-0.6, 0.8, 0.0), d);
        entering.try_install(hit_at(Vec3::ZERO, Vec3::Y, 1.0));
        let inside = entering.refracted_ray(&glass).unwrap().refracted.unwrap();
        assert_eq!(inside.refraction_index(), 1.5);
        assert!(inside.direction().y < 0.0);
        // Bends towards the normal
        assert!(inside.direction().x < d.x);

        // Leave through the bottom face (outward normal -Y)
        let mut leaving = inside.clone();
        leaving.try_install(hit_at(inside.at(1.0), Vec3::NEG_Y, 1.0));
        let out = leaving.refracted_ray(&glass).unwrap().refracted.unwrap();
        assert_eq!(out.refraction_index(), 1.0);
        assert!((out.direction() - d).length() < 1e-4);
    }

    #[test]
    fn test_total_internal_reflection() {
        let glass = Material::transparent(1.5);
        // Inside the glass, grazing the surface well past the critical angle
        let d = Vec3::new(0.9, 0.1, 0.0).normalize();
        let mut ray = Ray::new(Vec3::ZERO, d);
        ray.try_install(hit_at(ray.at(1.0), Vec3::Y, 1.0));

        let t = ray.refracted_ray(&glass).unwrap();
        assert!(t.refracted.is_none());
        assert_eq!(t.reflected.reflection_coefficient(), 1.0);
        assert!(t.reflected.direction().y < 0.0);
    }

    #[test]
    fn test_fresnel_split_weights() {
        let glass = Material::transparent(1.5);
        let mut ray = Ray::new(Vec3::Y, Vec3::NEG_Y);
        ray.try_install(hit_at(Vec3::ZERO, Vec3::Y, 1.0));

        let t = ray.refracted_ray(&glass).unwrap();
        let refracted = t.refracted.unwrap();
        let r = t.reflected.reflection_coefficient();

        // Normal incidence: R = R0 = 0.04
        assert!((r - 0.04).abs() < 1e-5);
        assert!((r + refracted.reflection_coefficient() - 1.0).abs() < 1e-6);
        assert!((refracted.direction() - Vec3::NEG_Y).length() < 1e-6);
    }

    #[test]
    fn test_fresnel_rises_towards_grazing() {
        let glass = Material::transparent(1.5);
        let reflectance = |origin: Vec3, direction: Vec3| {
            let mut ray = Ray::new(origin, direction);
            ray.try_install(hit_at(Vec3::ZERO, Vec3::Y, 1.0));
            let t = ray.refracted_ray(&glass).unwrap();
            let r = t.reflected.reflection_coefficient();
            let refracted = t.refracted.unwrap().reflection_coefficient();
            assert!((r + refracted - 1.0).abs() < 1e-6);
            r
        };

        let oblique = reflectance(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let grazing = reflectance(Vec3::new(-1.0, 0.05, 0.0), Vec3::new(0.95, -0.05, 0.0));
        assert!(oblique > 0.041);
        assert!(grazing > 0.5);
        assert!(grazing > oblique);

        // Leaving the glass at 30 degrees: the transmitted angle sets R
        let leaving = reflectance(Vec3::new(-0.5, -0.866, 0.0), Vec3::new(0.5, 0.866, 0.0));
        let cos_t = (1.0f32 - (1.5f32 * 0.5).powi(2)).sqrt();
        assert!((leaving - schlick(cos_t, 1.5, 1.0)).abs() < 1e-4);
        assert!(leaving > 0.043);
    }

    #[test]
    fn test_schlick_limits() {
        assert!((schlick(1.0, 1.0, 1.5) - 0.04).abs() < 1e-6);
        assert!((schlick(0.0, 1.0, 1.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_shadow_ray() {
        let mut ray = Ray::new(Vec3::new(0.0, 1.0, -1.0), Vec3::new(0.0, -1.0, 1.0));
        ray.try_install(hit_at(Vec3::ZERO, Vec3::Y, 2.0_f32.sqrt()));

        let target = Vec3::new(0.0, 2.0, 0.0);
        let shadow = ray.shadow_ray(target).unwrap();
        assert!((shadow.origin() - Vec3::new(0.0, SURFACE_OFFSET, 0.0)).length() < 1e-7);
        assert!((shadow.direction() - Vec3::Y).length() < 1e-6);
        assert!(shadow.hit().is_none());
    }
}
