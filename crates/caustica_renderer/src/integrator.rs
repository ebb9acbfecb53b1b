//! Monte-Carlo path integrator.
//!
//! Radiance along a camera ray is the emitted, transmitted, mirrored or
//! diffusely bounced light at its nearest hit. Diffuse hits add direct
//! lighting from every light and, optionally, the photon-map caustics
//! estimate. Russian roulette decides whether deeper bounces are traced.

use crate::config::RenderConfig;
use crate::material::{Color, Material, MaterialKind};
use crate::ray::{Ray, EPSILON};
use crate::sampling::gen_f32;
use crate::scene::Scene;
use crate::surface::{SurfaceId, SurfacePoint};
use caustica_math::Vec3;
use rand::RngCore;
use std::f32::consts::PI;

/// Decide whether the path ends at this bounce.
///
/// Draws one number per call. Camera rays (depth 0) always survive; later
/// bounces survive with the continuation probability, and nothing survives
/// past `max_depth`.
pub fn russian_roulette(depth: u32, config: &RenderConfig, rng: &mut dyn RngCore) -> bool {
    let survival = if depth == 0 {
        1.0
    } else {
        config.continuation_probability
    };
    gen_f32(rng) > survival || depth > config.max_depth
}

impl Scene {
    /// Radiance arriving along `ray`, clamped to [0, 1] per channel.
    ///
    /// The ray is intersected against the scene and keeps its hit.
    pub fn trace_ray(&self, ray: &mut Ray, depth: u32, rng: &mut dyn RngCore) -> Color {
        if !self.intersect(ray) {
            return Color::ZERO;
        }
        let Some(&hit) = ray.hit() else {
            return Color::ZERO;
        };
        let material = *self.material(hit.material);
        let terminated = russian_roulette(depth, &self.config, rng);

        let radiance = match material.kind() {
            MaterialKind::Emissive => {
                material.albedo() * hit.surface.map_or(0.0, |id| self.radiance(id))
            }
            MaterialKind::Transparent if !terminated => {
                self.trace_refracted(ray, &material, depth, rng)
            }
            MaterialKind::PerfectReflector if !terminated => {
                match ray.reflected_ray(&material, 0.0, 0.0) {
                    Some(mut mirrored) => {
                        self.trace_ray(&mut mirrored, depth + 1, rng) * material.albedo()
                    }
                    None => Color::ZERO,
                }
            }
            MaterialKind::Lambertian | MaterialKind::OrenNayar => {
                self.trace_diffuse(ray, &material, terminated, depth, rng)
            }
            MaterialKind::Transparent | MaterialKind::PerfectReflector => Color::ZERO,
        };

        radiance.clamp(Color::ZERO, Color::ONE)
    }

    /// Fresnel-weighted sum of the reflected and refracted radiance.
    fn trace_refracted(
        &self,
        ray: &Ray,
        material: &Material,
        depth: u32,
        rng: &mut dyn RngCore,
    ) -> Color {
        let Some(transmission) = ray.refracted_ray(material) else {
            return Color::ZERO;
        };

        let mut reflected = transmission.reflected;
        let mut radiance =
            self.trace_ray(&mut reflected, depth + 1, rng) * reflected.reflection_coefficient();

        if let Some(mut refracted) = transmission.refracted {
            radiance +=
                self.trace_ray(&mut refracted, depth + 1, rng) * refracted.reflection_coefficient();
        }
        radiance
    }

    fn trace_diffuse(
        &self,
        ray: &Ray,
        material: &Material,
        terminated: bool,
        depth: u32,
        rng: &mut dyn RngCore,
    ) -> Color {
        let mut radiance = self.direct_lighting(ray, material, rng);

        if !terminated {
            let (u1, u2) = (gen_f32(rng), gen_f32(rng));
            if let (Some(mut bounce), Some(normal)) =
                (ray.reflected_ray(material, u1, u2), ray.facing_normal())
            {
                let brdf = material.brdf(normal, ray.direction(), bounce.direction());
                radiance += self.trace_ray(&mut bounce, depth + 1, rng) * brdf;
            }
        }

        if self.config.use_photon_map {
            radiance += self.caustics(ray, material);
        }
        radiance
    }

    /// Light reaching the ray's hit straight from the scene's lights.
    ///
    /// Each light is sampled `shadow_samples` times; every unoccluded sample
    /// adds `BRDF · cosα · cosβ / d²`, and the sum is weighted by
    /// `radiance · area / (samples · 2π)`.
    pub fn direct_lighting(&self, ray: &Ray, material: &Material, rng: &mut dyn RngCore) -> Color {
        let Some(normal) = ray.facing_normal() else {
            return Color::ZERO;
        };
        let samples = self.config.shadow_samples.max(1);

        let mut radiance = Color::ZERO;
        for &light in self.lights() {
            let surface = self.surface(light);

            let mut sum = Color::ZERO;
            for _ in 0..samples {
                let sample = surface.sample_point(gen_f32(rng), gen_f32(rng));
                sum += self.shadow_contribution(ray, material, normal, light, &sample);
            }

            let weight = surface.area() / (samples as f32 * 2.0 * PI);
            radiance += sum * self.emitted_color(light) * weight;
        }
        radiance
    }

    /// Geometric term of one light sample, zero when occluded or facing away.
    fn shadow_contribution(
        &self,
        ray: &Ray,
        material: &Material,
        normal: Vec3,
        light: SurfaceId,
        sample: &SurfacePoint,
    ) -> Color {
        let Some(mut shadow) = ray.shadow_ray(sample.position) else {
            return Color::ZERO;
        };
        let distance_squared = sample.position.distance_squared(shadow.origin());
        let to_light = shadow.direction();

        let cos_alpha = normal.dot(to_light);
        let cos_beta = sample.normal.dot(-to_light);
        if cos_alpha <= 0.0 || cos_beta <= 0.0 || distance_squared <= EPSILON {
            return Color::ZERO;
        }

        if !self.intersect(&mut shadow) {
            return Color::ZERO;
        }
        match shadow.hit() {
            Some(hit) if hit.surface == Some(light) => {}
            _ => return Color::ZERO,
        }

        material.brdf(normal, ray.direction(), to_light) * (cos_alpha * cos_beta / distance_squared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Sphere, Triangle};
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Every draw is exactly 0.5.
    fn half_rng() -> StepRng {
        StepRng::new(0x8000_0000, 0)
    }

    /// White Lambertian floor at y = 0 with a small downward-facing light
    /// at height 1 centred over the origin.
    fn lit_floor(config: RenderConfig, emissivity: f32) -> (Scene, SurfaceId, SurfaceId) {
        let mut scene = Scene::new(config).unwrap();
        let white = scene.add_material(Material::lambertian(Color::ONE));
        let lamp = scene.add_material(Material::emissive(Color::ONE, emissivity));

        let floor = scene
            .add_surface(Triangle::new(
                Vec3::new(-10.0, 0.0, 10.0),
                Vec3::new(10.0, 0.0, 10.0),
                Vec3::new(0.0, 0.0, -10.0),
                white,
            ))
            .unwrap();
        let light = scene
            .add_surface(Triangle::new(
                Vec3::new(-0.1, 1.0, -0.1),
                Vec3::new(0.1, 1.0, -0.1),
                Vec3::new(0.0, 1.0, 0.1),
                lamp,
            ))
            .unwrap();
        (scene, floor, light)
    }

    #[test]
    fn test_roulette_never_terminates_camera_rays() {
        let config = RenderConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10_000 {
            assert!(!russian_roulette(0, &config, &mut rng));
        }
    }

    #[test]
    fn test_roulette_termination_rate() {
        let config = RenderConfig::default();
        let mut rng = StdRng::seed_from_u64(2);

        let trials = 100_000;
        let terminated = (0..trials)
            .filter(|_| russian_roulette(1, &config, &mut rng))
            .count();
        let rate = terminated as f32 / trials as f32;
        assert!((rate - 0.2).abs() < 0.01, "termination rate {}", rate);
    }

    #[test]
    fn test_roulette_past_max_depth() {
        let config = RenderConfig {
            continuation_probability: 1.0,
            ..RenderConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        assert!(!russian_roulette(config.max_depth, &config, &mut rng));
        assert!(russian_roulette(config.max_depth + 1, &config, &mut rng));
    }

    #[test]
    fn test_miss_is_black() {
        let (scene, _, _) = lit_floor(RenderConfig::default(), 1.0);
        let mut ray = Ray::new(Vec3::new(0.0, 0.5, 0.0), Vec3::new(1.0, 1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(scene.trace_ray(&mut ray, 0, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_direct_lighting_matches_closed_form() {
        let emissivity = 1.0;
        let (scene, floor, light) = lit_floor(RenderConfig::default(), emissivity);

        let mut ray = Ray::new(Vec3::new(1.0, 0.5, 0.0), Vec3::new(-1.0, -0.5, 0.0));
        let color = scene.trace_ray(&mut ray, 0, &mut half_rng());
        let hit = ray.hit().unwrap();
        assert_eq!(hit.surface, Some(floor));

        // With every draw at 0.5 the light sample is fixed and the
        // indirect bounce leaves at 45° without hitting anything.
        let sample = scene.surface(light).sample_point(0.5, 0.5);
        let to_light = sample.position - (hit.point + Vec3::Y * crate::ray::SURFACE_OFFSET);
        let d2 = to_light.length_squared();
        let cos = to_light.y / d2.sqrt();

        // L·A = E/π, so the estimate is E·cosα·cosβ / (2π²·d²)
        let expected = emissivity * cos * cos / (2.0 * PI * PI * d2);
        assert!(expected > 0.01 && expected < 1.0);
        for channel in [color.x, color.y, color.z] {
            assert!(
                (channel - expected).abs() < expected * 0.01,
                "{} vs {}",
                channel,
                expected
            );
        }
    }

    #[test]
    fn test_light_facing_away_gives_no_direct_light() {
        let mut scene = Scene::new(RenderConfig::default()).unwrap();
        let white = scene.add_material(Material::lambertian(Color::ONE));
        let lamp = scene.add_material(Material::emissive(Color::ONE, 1.0));
        scene
            .add_surface(Triangle::new(
                Vec3::new(-10.0, 0.0, 10.0),
                Vec3::new(10.0, 0.0, 10.0),
                Vec3::new(0.0, 0.0, -10.0),
                white,
            ))
            .unwrap();
        // Same light as `lit_floor`, wound to face upwards
        scene
            .add_surface(Triangle::new(
                Vec3::new(-0.1, 1.0, -0.1),
                Vec3::new(0.0, 1.0, 0.1),
                Vec3::new(0.1, 1.0, -0.1),
                lamp,
            ))
            .unwrap();

        let mut ray = Ray::new(Vec3::new(1.0, 0.5, 0.0), Vec3::new(-1.0, -0.5, 0.0));
        assert!(scene.intersect(&mut ray));
        let material = *scene.material(white);
        let direct = scene.direct_lighting(&ray, &material, &mut half_rng());
        assert_eq!(direct, Color::ZERO);
    }

    #[test]
    fn test_occluded_light_gives_no_direct_light() {
        let (mut scene, _, _) = lit_floor(RenderConfig::default(), 1.0);
        let grey = scene.add_material(Material::lambertian(Color::splat(0.5)));
        scene
            .add_surface(Sphere::new(Vec3::new(0.0, 0.5, 0.0), 0.2, grey))
            .unwrap();

        let mut ray = Ray::new(Vec3::new(1.0, 0.5, 0.0), Vec3::new(-1.0, -0.5, 0.0));
        assert!(scene.intersect(&mut ray));
        let white = *scene.material(ray.hit().unwrap().material);
        let direct = scene.direct_lighting(&ray, &white, &mut half_rng());
        assert_eq!(direct, Color::ZERO);
    }

    #[test]
    fn test_emissive_hit_returns_radiance() {
        let mut scene = Scene::new(RenderConfig::default()).unwrap();
        let lamp = scene.add_material(Material::emissive(Color::new(1.0, 0.5, 0.25), 0.1));
        let bulb = scene
            .add_surface(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, lamp))
            .unwrap();

        let mut ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let color = scene.trace_ray(&mut ray, 0, &mut StdRng::seed_from_u64(5));
        let expected = Color::new(1.0, 0.5, 0.25) * scene.radiance(bulb);
        assert!((color - expected).length() < 1e-6);
    }

    #[test]
    fn test_mirror_reflects_light() {
        let mut scene = Scene::new(RenderConfig::default()).unwrap();
        let mirror = scene.add_material(Material::perfect_reflector(Color::splat(0.5)));
        let lamp = scene.add_material(Material::emissive(Color::ONE, 1.0));

        scene
            .add_surface(Triangle::new(
                Vec3::new(-10.0, 0.0, 10.0),
                Vec3::new(10.0, 0.0, 10.0),
                Vec3::new(0.0, 0.0, -10.0),
                mirror,
            ))
            .unwrap();
        let bulb = scene
            .add_surface(Sphere::new(Vec3::new(2.0, 2.0, 0.0), 0.5, lamp))
            .unwrap();

        // Bounces off the mirror at the origin straight into the bulb
        let mut ray = Ray::new(Vec3::new(-2.0, 2.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let color = scene.trace_ray(&mut ray, 0, &mut StdRng::seed_from_u64(6));
        let expected = Color::splat(0.5 * scene.radiance(bulb));
        assert!((color - expected).length() < 1e-5);
    }

    #[test]
    fn test_radiance_clamped() {
        // A very bright light close to the floor saturates every channel
        let (scene, _, _) = lit_floor(RenderConfig::default(), 1000.0);
        let mut rng = StdRng::seed_from_u64(7);

        for i in 0..200 {
            let x = (i as f32 / 200.0) * 2.0 - 1.0;
            let mut ray = Ray::new(Vec3::new(x, 0.5, 2.0), Vec3::new(0.0, -0.5, -2.0));
            let color = scene.trace_ray(&mut ray, 0, &mut rng);
            assert!(color.max_element() <= 1.0);
            assert!(color.min_element() >= 0.0);
        }

        let mut ray = Ray::new(Vec3::new(1.0, 0.5, 0.0), Vec3::new(-1.0, -0.5, 0.0));
        let color = scene.trace_ray(&mut ray, 0, &mut half_rng());
        assert_eq!(color, Color::ONE);
    }
}
