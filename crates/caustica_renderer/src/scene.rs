//! Scene registry: materials, surfaces, lights and the photon map.
//!
//! Materials and surfaces live in append-only lists and are referred to by
//! [`MaterialId`] and [`SurfaceId`]. The integrator, the photon tracer and
//! the render driver are `impl Scene` blocks in their own modules.

use crate::config::{ConfigResult, RenderConfig};
use crate::material::{Color, Material, MaterialKind};
use crate::mesh::Mesh;
use crate::photon_map::PhotonMap;
use crate::ray::Ray;
use crate::surface::{MaterialId, Surface, SurfaceId};
use caustica_core::{MeshData, MeshError};
use caustica_math::Vec3;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("material {0:?} is not registered with this scene")]
    UnknownMaterial(MaterialId),

    #[error("invalid mesh: {0}")]
    Mesh(#[from] MeshError),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// A static scene ready to be rendered.
pub struct Scene {
    pub(crate) config: RenderConfig,
    materials: Vec<Material>,
    surfaces: Vec<Box<dyn Surface>>,
    /// Emitted radiance per surface, zero for non-emitters
    radiances: Vec<f32>,
    lights: Vec<SurfaceId>,
    pub(crate) photon_map: PhotonMap,
}

impl Scene {
    /// Empty scene rendered with `config`, which must pass validation.
    pub fn new(config: RenderConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            materials: Vec::new(),
            surfaces: Vec::new(),
            radiances: Vec::new(),
            lights: Vec::new(),
            photon_map: PhotonMap::new(),
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    /// Register a surface. Surfaces with an emissive material become lights.
    pub fn add_surface<S: Surface + 'static>(&mut self, surface: S) -> SceneResult<SurfaceId> {
        let material_id = surface.material();
        let material = *self
            .materials
            .get(material_id.0)
            .ok_or(SceneError::UnknownMaterial(material_id))?;

        let id = SurfaceId(self.surfaces.len());
        let radiance = material.emitted_radiance(surface.area());
        if material.kind() == MaterialKind::Emissive {
            if radiance > 0.0 {
                self.lights.push(id);
            } else {
                log::warn!(
                    "Emissive surface {:?} has no area or power, not used as a light",
                    id
                );
            }
        }

        self.surfaces.push(Box::new(surface));
        self.radiances.push(radiance);
        Ok(id)
    }

    /// Validate mesh arrays and register them as one octree-accelerated surface.
    pub fn add_mesh(
        &mut self,
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        normals: Option<Vec<Vec3>>,
        material: MaterialId,
    ) -> SceneResult<SurfaceId> {
        let data = MeshData::new(positions, indices, normals)?;
        let mesh = Mesh::new(data, material, self.config.octree_max_depth);
        self.add_surface(mesh)
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn surface(&self, id: SurfaceId) -> &dyn Surface {
        self.surfaces[id.0].as_ref()
    }

    /// Emitted radiance of a surface, zero for non-emitters.
    pub fn radiance(&self, id: SurfaceId) -> f32 {
        self.radiances[id.0]
    }

    /// Radiance of a light tinted by its material colour.
    pub fn emitted_color(&self, id: SurfaceId) -> Color {
        self.material(self.surface(id).material()).albedo() * self.radiance(id)
    }

    pub fn lights(&self) -> &[SurfaceId] {
        &self.lights
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn photon_map(&self) -> &PhotonMap {
        &self.photon_map
    }

    /// Find the nearest hit among all surfaces and record which surface it
    /// belongs to.
    pub fn intersect(&self, ray: &mut Ray) -> bool {
        if ray.is_degenerate() {
            return false;
        }

        let mut hit_anything = false;
        for (i, surface) in self.surfaces.iter().enumerate() {
            if surface.intersect(ray) {
                ray.stamp_surface(SurfaceId(i));
                hit_anything = true;
            }
        }
        hit_anything
    }
}
