//! Photon pass and caustics estimate.
//!
//! Photons leave the lights in proportion to their power and follow the same
//! reflect/refract rules as camera rays. Only caustic photons are kept: a
//! photon is deposited at a diffuse hit reached straight from a mirror or
//! glass surface.

use crate::integrator::russian_roulette;
use crate::material::{Color, Material, MaterialKind};
use crate::photon_map::Photon;
use crate::ray::{Ray, SURFACE_OFFSET};
use crate::sampling::{cosine_weighted_direction, cumulative, gen_f32, pick_cumulative};
use crate::scene::Scene;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::f32::consts::PI;
use std::time::Instant;

impl Scene {
    /// Rebuild the photon map from `photon_count` emissions per pass.
    ///
    /// Must run before rendering; the map is read-only afterwards.
    pub fn generate_photon_map(&mut self, photon_count: usize) {
        let start = Instant::now();
        self.photon_map.clear();

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let emissions = photon_count * self.config.photon_passes as usize;
        let photons = self.emit_photons(emissions, &mut rng);

        for photon in photons {
            self.photon_map.store(photon);
        }
        self.photon_map.build();

        log::info!(
            "Photon map: {} photons stored from {} emitted in {:.2?}",
            self.photon_map.len(),
            emissions,
            start.elapsed()
        );
    }

    fn emit_photons(&self, emissions: usize, rng: &mut dyn RngCore) -> Vec<Photon> {
        let mut photons = Vec::new();

        // Lights are chosen in proportion to mean(RGB) · area
        let power = self.lights().iter().map(|&id| {
            let color = self.emitted_color(id);
            (color.x + color.y + color.z) / 3.0 * self.surface(id).area()
        });
        let cdf = cumulative(power);
        if cdf.last().map_or(true, |&total| total <= 0.0) {
            if emissions > 0 {
                log::warn!("No light emits any power, photon map left empty");
            }
            return photons;
        }

        for _ in 0..emissions {
            let Some(i) = pick_cumulative(&cdf, gen_f32(rng)) else {
                break;
            };
            let light = self.lights()[i];
            let sample = self.surface(light).sample_point(gen_f32(rng), gen_f32(rng));
            let direction = cosine_weighted_direction(sample.normal, gen_f32(rng), gen_f32(rng));

            let mut ray = Ray::new(sample.position + sample.normal * SURFACE_OFFSET, direction);
            let power = self.emitted_color(light);
            self.trace_photon_ray(&mut ray, power, 0, false, rng, &mut photons);
        }
        photons
    }

    /// Follow one photon path.
    ///
    /// `specular` is set while the path has bounced off mirrors or glass
    /// since it last left a diffuse surface; a photon is pushed at each
    /// diffuse hit reached in that state.
    pub fn trace_photon_ray(
        &self,
        ray: &mut Ray,
        power: Color,
        depth: u32,
        specular: bool,
        rng: &mut dyn RngCore,
        photons: &mut Vec<Photon>,
    ) {
        if !self.intersect(ray) {
            return;
        }
        let Some(&hit) = ray.hit() else {
            return;
        };
        let material = *self.material(hit.material);
        let terminated = russian_roulette(depth, &self.config, rng);

        match material.kind() {
            // Absorbed by the light
            MaterialKind::Emissive => {}

            MaterialKind::Transparent => {
                if terminated {
                    return;
                }
                let Some(transmission) = ray.refracted_ray(&material) else {
                    return;
                };
                let mut reflected = transmission.reflected;
                let weight = reflected.reflection_coefficient();
                self.trace_photon_ray(
                    &mut reflected,
                    power * weight,
                    depth + 1,
                    true,
                    rng,
                    photons,
                );

                if let Some(mut refracted) = transmission.refracted {
                    let weight = refracted.reflection_coefficient();
                    self.trace_photon_ray(
                        &mut refracted,
                        power * weight,
                        depth + 1,
                        true,
                        rng,
                        photons,
                    );
                }
            }

            MaterialKind::PerfectReflector => {
                if terminated {
                    return;
                }
                if let Some(mut mirrored) = ray.reflected_ray(&material, 0.0, 0.0) {
                    let power = power * material.albedo();
                    self.trace_photon_ray(&mut mirrored, power, depth + 1, true, rng, photons);
                }
            }

            MaterialKind::Lambertian | MaterialKind::OrenNayar => {
                let Some(normal) = ray.facing_normal() else {
                    return;
                };

                if specular {
                    let radius = self.config.photon_radius;
                    let flux =
                        power / self.config.continuation_probability * (PI * radius * radius) * PI;
                    photons.push(Photon {
                        position: hit.point + normal * SURFACE_OFFSET,
                        direction: -ray.direction(),
                        flux,
                    });
                }

                if terminated {
                    return;
                }
                let (u1, u2) = (gen_f32(rng), gen_f32(rng));
                if let Some(mut bounce) = ray.reflected_ray(&material, u1, u2) {
                    let brdf = material.brdf(normal, ray.direction(), bounce.direction());
                    self.trace_photon_ray(
                        &mut bounce,
                        power * brdf,
                        depth + 1,
                        false,
                        rng,
                        photons,
                    );
                }
            }
        }
    }

    /// Photon density estimate of the light arriving at the ray's hit.
    ///
    /// Averages `BRDF · flux / (π r² · 2π)` over the photons within the
    /// gather radius; zero when there are none.
    pub fn caustics(&self, ray: &Ray, material: &Material) -> Color {
        let (Some(hit), Some(normal)) = (ray.hit(), ray.facing_normal()) else {
            return Color::ZERO;
        };

        let radius = self.config.photon_radius;
        let photons = self.photon_map.within_radius(hit.point, radius);
        if photons.is_empty() {
            return Color::ZERO;
        }

        let sum: Color = photons
            .iter()
            .map(|p| material.brdf(normal, ray.direction(), p.direction) * p.flux)
            .sum();
        sum / (PI * radius * radius * 2.0 * PI) / photons.len() as f32
    }
}
