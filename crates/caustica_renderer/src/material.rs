//! Surface materials and BRDF evaluation.
//!
//! A material is a kind tag plus its numeric parameters. Every decision
//! point in the integrator matches on [`MaterialKind`] once.

use caustica_math::Vec3;
use std::f32::consts::PI;

/// Color type alias (linear RGB)
pub type Color = Vec3;

/// What a surface does with light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    Lambertian,
    OrenNayar,
    PerfectReflector,
    Transparent,
    Emissive,
}

/// Immutable material description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    kind: MaterialKind,
    albedo: Color,
    refraction_index: f32,
    emissivity: f32,
    roughness: f32,
}

impl Material {
    fn with_kind(kind: MaterialKind, albedo: Color) -> Self {
        Self {
            kind,
            albedo,
            refraction_index: 1.0,
            emissivity: 0.0,
            roughness: 0.0,
        }
    }

    /// Ideal diffuse reflector.
    pub fn lambertian(albedo: Color) -> Self {
        Self::with_kind(MaterialKind::Lambertian, albedo)
    }

    /// Rough diffuse reflector; `roughness` is the standard deviation σ of
    /// the microfacet slope angle.
    pub fn oren_nayar(albedo: Color, roughness: f32) -> Self {
        Self {
            roughness,
            ..Self::with_kind(MaterialKind::OrenNayar, albedo)
        }
    }

    /// Lossless mirror tinted by `reflectance`.
    pub fn perfect_reflector(reflectance: Color) -> Self {
        Self::with_kind(MaterialKind::PerfectReflector, reflectance)
    }

    /// Dielectric such as glass or water.
    pub fn transparent(refraction_index: f32) -> Self {
        Self {
            refraction_index,
            ..Self::with_kind(MaterialKind::Transparent, Color::ONE)
        }
    }

    /// Area light. `emissivity` is the total emitted power; radiance follows
    /// from the area of the surface it is attached to.
    pub fn emissive(albedo: Color, emissivity: f32) -> Self {
        Self {
            emissivity,
            ..Self::with_kind(MaterialKind::Emissive, albedo)
        }
    }

    pub fn kind(&self) -> MaterialKind {
        self.kind
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }

    pub fn refraction_index(&self) -> f32 {
        self.refraction_index
    }

    pub fn emissivity(&self) -> f32 {
        self.emissivity
    }

    pub fn roughness(&self) -> f32 {
        self.roughness
    }

    /// Lambertian and Oren-Nayar surfaces: those that receive direct
    /// lighting, scatter diffusely and collect photons.
    pub fn is_diffuse(&self) -> bool {
        matches!(self.kind, MaterialKind::Lambertian | MaterialKind::OrenNayar)
    }

    /// Radiance emitted by a surface of the given area, zero unless emissive.
    pub fn emitted_radiance(&self, area: f32) -> f32 {
        if self.kind == MaterialKind::Emissive && area > 0.0 {
            self.emissivity / (area * PI)
        } else {
            0.0
        }
    }

    /// Evaluate the BRDF.
    ///
    /// `incoming` is the direction of travel of the arriving ray (towards the
    /// surface) and `outgoing` points away from it, e.g. towards a light.
    /// `normal` must face the incoming side.
    pub fn brdf(&self, normal: Vec3, incoming: Vec3, outgoing: Vec3) -> Color {
        match self.kind {
            MaterialKind::Lambertian | MaterialKind::Emissive => self.albedo,
            MaterialKind::PerfectReflector | MaterialKind::Transparent => Color::ONE,
            MaterialKind::OrenNayar => self.oren_nayar_brdf(normal, -incoming, outgoing),
        }
    }

    fn oren_nayar_brdf(&self, normal: Vec3, to_viewer: Vec3, to_light: Vec3) -> Color {
        let sigma2 = self.roughness * self.roughness;
        let a = 1.0 - 0.5 * sigma2 / (sigma2 + 0.57);
        let b = 0.45 * sigma2 / (sigma2 + 0.09);

        let theta_i = normal.dot(to_viewer).clamp(-1.0, 1.0).acos();
        let theta_o = normal.dot(to_light).clamp(-1.0, 1.0).acos();

        // Azimuth difference from the projections onto the tangent plane.
        // Either projection vanishing means the azimuth term has no weight.
        let tangent_i = (to_viewer - normal * normal.dot(to_viewer)).normalize_or_zero();
        let tangent_o = (to_light - normal * normal.dot(to_light)).normalize_or_zero();
        let cos_delta_phi = tangent_i.dot(tangent_o).max(0.0);

        let alpha = theta_i.max(theta_o);
        let beta = theta_i.min(theta_o);

        self.albedo / PI * (a + b * cos_delta_phi * alpha.sin() * beta.sin())
    }
}
