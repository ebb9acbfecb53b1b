//! Caustica Renderer - CPU path tracing with photon-mapped caustics.
//!
//! A Monte Carlo path tracer over spheres, triangles and octree-accelerated
//! meshes. Direct lighting is sampled with shadow rays at every diffuse
//! hit; a separate photon pass stores light arriving through mirrors and
//! glass in a kd-tree and adds it back as a density estimate.
//!
//! Typical use:
//!
//! ```
//! use caustica_renderer::{Camera, Color, Material, Ray, RenderConfig, Scene, Sphere, Vec3};
//!
//! struct Orthographic;
//!
//! impl Camera for Orthographic {
//!     fn width(&self) -> u32 { 4 }
//!     fn height(&self) -> u32 { 4 }
//!     fn cast_ray(&self, x: u32, y: u32, jx: f32, jy: f32) -> Ray {
//!         let u = (x as f32 + 0.5 + jx) / 2.0 - 1.0;
//!         let v = (y as f32 + 0.5 + jy) / 2.0 - 1.0;
//!         Ray::new(Vec3::new(u, v, 5.0), Vec3::NEG_Z)
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut scene = Scene::new(RenderConfig::default())?;
//! let white = scene.add_material(Material::lambertian(Color::ONE));
//! let lamp = scene.add_material(Material::emissive(Color::ONE, 10.0));
//! scene.add_surface(Sphere::new(Vec3::ZERO, 1.0, white))?;
//! scene.add_surface(Sphere::new(Vec3::new(0.0, 3.0, 2.0), 0.5, lamp))?;
//!
//! scene.generate_photon_map(100);
//! let image = scene.render(&Orthographic, 1);
//! assert_eq!(image.pixels.len(), 16);
//! # Ok(())
//! # }
//! ```
//!
//! `examples/cornell_box.rs` renders a full scene to PPM.

mod config;
mod integrator;
mod material;
mod mesh;
mod octree;
mod photon_map;
mod photon_tracer;
mod ray;
mod renderer;
mod sampling;
mod scene;
mod sphere;
mod surface;
mod triangle;

pub use config::{ConfigError, ConfigResult, RenderConfig};
pub use integrator::russian_roulette;
pub use material::{Color, Material, MaterialKind};
pub use mesh::Mesh;
pub use octree::{OctreeNode, LEAF_TRIANGLES};
pub use photon_map::{Photon, PhotonMap};
pub use ray::{
    reflect, refract, schlick, Intersection, Ray, Transmission, EPSILON, SURFACE_OFFSET,
};
pub use renderer::{Camera, ImageBuffer};
pub use scene::{Scene, SceneError, SceneResult};
pub use sphere::Sphere;
pub use surface::{MaterialId, Surface, SurfaceId, SurfacePoint};
pub use triangle::Triangle;

/// Re-export Vec3 and common math types from caustica_math
pub use caustica_math::{Aabb, Interval, Vec3};
