//! Triangle mesh surface backed by an octree.

use crate::octree::OctreeNode;
use crate::ray::{Ray, EPSILON};
use crate::sampling::{cumulative, pick_cumulative, uniform_triangle_point};
use crate::surface::{MaterialId, Surface, SurfacePoint};
use caustica_core::MeshData;
use caustica_math::{Interval, Vec3};

/// A smooth-shaded triangle mesh.
#[derive(Debug)]
pub struct Mesh {
    data: MeshData,
    octree: OctreeNode,
    /// Cumulative triangle areas, normalized, for uniform point sampling
    area_cdf: Vec<f32>,
    area: f32,
    material: MaterialId,
}

impl Mesh {
    /// Build the octree (up to `octree_depth` levels) and sampling tables.
    pub fn new(data: MeshData, material: MaterialId, octree_depth: u32) -> Self {
        let octree = OctreeNode::new(&data, octree_depth);
        let areas: Vec<f32> = (0..data.triangle_count())
            .map(|i| data.triangle_area(i))
            .collect();
        let area: f32 = areas.iter().sum();

        let area_cdf = if area > 0.0 {
            cumulative(areas)
        } else {
            log::warn!("Mesh has zero surface area, sampling triangles uniformly");
            cumulative(std::iter::repeat(1.0).take(data.triangle_count()))
        };

        Self {
            data,
            octree,
            area_cdf,
            area,
            material,
        }
    }

    pub fn data(&self) -> &MeshData {
        &self.data
    }

    pub fn octree(&self) -> &OctreeNode {
        &self.octree
    }
}

impl Surface for Mesh {
    fn intersect(&self, ray: &mut Ray) -> bool {
        if ray.is_degenerate() {
            return false;
        }
        let ray_t = Interval::new(EPSILON, ray.nearest_t());
        if !self.octree.bbox().hit(&ray.to_math_ray(), ray_t) {
            return false;
        }
        self.octree.intersect(&self.data, self.material, ray)
    }

    fn sample_point(&self, u: f32, v: f32) -> SurfacePoint {
        let i = pick_cumulative(&self.area_cdf, u).unwrap_or(0);

        // Reuse the part of `u` inside the chosen bucket
        let lo = if i == 0 { 0.0 } else { self.area_cdf[i - 1] };
        let span = self.area_cdf[i] - lo;
        let u = if span > 0.0 {
            ((u - lo) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let [a, b, c] = self.data.triangle_positions(i);
        SurfacePoint {
            position: uniform_triangle_point(a, b, c, u, v),
            normal: (b - a).cross(c - a).try_normalize().unwrap_or(Vec3::Y),
        }
    }

    fn area(&self) -> f32 {
        self.area
    }

    fn material(&self) -> MaterialId {
        self.material
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit cube centred at the origin, outward-facing.
    fn cube() -> MeshData {
        let positions = vec![
            Vec3::new(-0.5, -0.5, -0.5),
            Vec3::new(0.5, -0.5, -0.5),
            Vec3::new(0.5, 0.5, -0.5),
            Vec3::new(-0.5, 0.5, -0.5),
            Vec3::new(-0.5, -0.5, 0.5),
            Vec3::new(0.5, -0.5, 0.5),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(-0.5, 0.5, 0.5),
        ];
        let indices = vec![
            0, 2, 1, 0, 3, 2, // back
            4, 5, 6, 4, 6, 7, // front
            0, 1, 5, 0, 5, 4, // bottom
            3, 7, 6, 3, 6, 2, // top
            0, 4, 7, 0, 7, 3, // left
            1, 2, 6, 1, 6, 5, // right
        ];
        MeshData::new(positions, indices, None).unwrap()
    }

    #[test]
    fn test_cube_area() {
        let mesh = Mesh::new(cube(), MaterialId(0), 8);
        assert!((mesh.area() - 6.0).abs() < 1e-5);
        assert_eq!(mesh.material(), MaterialId(0));
    }

    #[test]
    fn test_cube_hit_front_face() {
        let mesh = Mesh::new(cube(), MaterialId(0), 8);
        let mut ray = Ray::new(Vec3::new(0.1, 0.2, 3.0), Vec3::NEG_Z);
        assert!(mesh.intersect(&mut ray));

        let hit = ray.hit().unwrap();
        assert!((hit.t - 2.5).abs() < 1e-5);
        // Smooth normals on a cube corner-average, but still face outwards
        assert!(hit.normal.z > 0.0);
    }

    #[test]
    fn test_cube_hit_from_inside() {
        let mesh = Mesh::new(cube(), MaterialId(0), 8);
        let mut ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(mesh.intersect(&mut ray));
        assert!((ray.nearest_t() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_cube_miss() {
        let mesh = Mesh::new(cube(), MaterialId(0), 8);
        let mut ray = Ray::new(Vec3::new(2.0, 0.0, 3.0), Vec3::NEG_Z);
        assert!(!mesh.intersect(&mut ray));

        let mut zero = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO);
        assert!(!mesh.intersect(&mut zero));
    }

    #[test]
    fn test_samples_lie_on_surface() {
        let mesh = Mesh::new(cube(), MaterialId(0), 8);
        for i in 0..50 {
            let u = i as f32 / 50.0;
            let p = mesh.sample_point(u, 1.0 - u);
            let max_coord = p.position.abs().max_element();
            assert!((max_coord - 0.5).abs() < 1e-5);
            // Face normal points along the axis the point lies on
            assert!((p.normal.length() - 1.0).abs() < 1e-5);
            assert!(p.normal.dot(p.position) > 0.0);
        }
    }
}
