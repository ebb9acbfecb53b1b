//! Octree acceleration structure over a mesh's triangles.
//!
//! Each node covers one octant of its parent's box. A triangle is listed in
//! every node whose box it overlaps, so a leaf hit is exact for that leaf
//! but the ray must still keep the nearest hit across leaves.

use crate::ray::{Intersection, Ray, EPSILON};
use crate::surface::MaterialId;
use crate::triangle::moller_trumbore;
use caustica_core::MeshData;
use caustica_math::{Aabb, Interval, Vec3};

/// Nodes with at most this many triangles are not split.
pub const LEAF_TRIANGLES: usize = 16;

/// Octree node - either eight octant children or a leaf with triangles.
#[derive(Debug)]
pub enum OctreeNode {
    /// Triangles are indices into the mesh (not into its index buffer).
    Leaf { bbox: Aabb, triangles: Vec<u32> },
    Branch {
        bbox: Aabb,
        children: Box<[OctreeNode; 8]>,
    },
}

impl OctreeNode {
    /// Build the tree for every triangle of `mesh` within its bounds.
    pub fn new(mesh: &MeshData, max_depth: u32) -> Self {
        let triangles = (0..mesh.triangle_count() as u32).collect();
        let root = Self::build(mesh, mesh.bounds, triangles, max_depth);

        let (nodes, leaves) = root.stats();
        log::debug!(
            "Octree: {} triangles, {} nodes, {} leaves",
            mesh.triangle_count(),
            nodes,
            leaves
        );
        root
    }

    /// Recursive construction.
    ///
    /// `triangles` are the ones overlapping `bbox`; each octant keeps the
    /// subset overlapping its own box and takes ownership of that list.
    fn build(mesh: &MeshData, bbox: Aabb, triangles: Vec<u32>, depth: u32) -> Self {
        if depth == 0 || triangles.len() <= LEAF_TRIANGLES {
            return OctreeNode::Leaf { bbox, triangles };
        }

        let octants: [(Aabb, Vec<u32>); 8] = std::array::from_fn(|i| {
            let octant = bbox.octant(i);
            let inside = triangles
                .iter()
                .copied()
                .filter(|&tri| {
                    let [a, b, c] = mesh.triangle_positions(tri as usize);
                    octant.overlaps_triangle(a, b, c)
                })
                .collect();
            (octant, inside)
        });

        // Splitting cannot separate triangles that cover every octant
        if octants.iter().all(|(_, inside)| inside.len() == triangles.len()) {
            return OctreeNode::Leaf { bbox, triangles };
        }

        let children = octants.map(|(octant, inside)| {
            Self::build(mesh, octant, inside, depth - 1)
        });
        OctreeNode::Branch {
            bbox,
            children: Box::new(children),
        }
    }

    pub fn bbox(&self) -> &Aabb {
        match self {
            OctreeNode::Leaf { bbox, .. } | OctreeNode::Branch { bbox, .. } => bbox,
        }
    }

    /// Total node count and leaf count.
    pub fn stats(&self) -> (usize, usize) {
        match self {
            OctreeNode::Leaf { .. } => (1, 1),
            OctreeNode::Branch { children, .. } => {
                children.iter().fold((1, 0), |(nodes, leaves), child| {
                    let (n, l) = child.stats();
                    (nodes + n, leaves + l)
                })
            }
        }
    }

    /// Intersect the ray with the mesh triangles below this node.
    ///
    /// Installs the nearest hit with a normal interpolated from the vertex
    /// normals; returns true if any hit was installed.
    pub fn intersect(&self, mesh: &MeshData, material: MaterialId, ray: &mut Ray) -> bool {
        match self {
            OctreeNode::Leaf { triangles, .. } => {
                Self::intersect_leaf(triangles, mesh, material, ray)
            }

            OctreeNode::Branch { children, .. } => {
                let math_ray = ray.to_math_ray();
                let mut hit_anything = false;

                for child in children.iter() {
                    // Skip boxes that start beyond the nearest hit so far
                    let ray_t = Interval::new(EPSILON, ray.nearest_t());
                    if child.bbox().hit(&math_ray, ray_t)
                        && child.intersect(mesh, material, ray)
                    {
                        hit_anything = true;
                    }
                }
                hit_anything
            }
        }
    }

    fn intersect_leaf(
        triangles: &[u32],
        mesh: &MeshData,
        material: MaterialId,
        ray: &mut Ray,
    ) -> bool {
        let origin = ray.origin();
        let direction = ray.direction();

        let mut closest: Option<(f32, usize, f32, f32)> = None;
        for &tri in triangles {
            let tri = tri as usize;
            let [a, b, c] = mesh.triangle_positions(tri);
            let Some((t, u, v)) = moller_trumbore(origin, direction, a, b - a, c - a) else {
                continue;
            };
            if t > EPSILON && closest.map_or(true, |(best, ..)| t < best) {
                closest = Some((t, tri, u, v));
            }
        }

        let Some((t, tri, u, v)) = closest else {
            return false;
        };
        if !ray.is_closer(t) {
            return false;
        }

        let [i0, i1, i2] = mesh.triangle(tri);
        let smooth =
            mesh.normals[i0] * (1.0 - u - v) + mesh.normals[i1] * u + mesh.normals[i2] * v;
        let normal = match smooth.try_normalize() {
            Some(n) => n,
            None => {
                let [a, b, c] = mesh.triangle_positions(tri);
                (b - a).cross(c - a).try_normalize().unwrap_or(Vec3::Y)
            }
        };

        ray.try_install(Intersection {
            point: ray.at(t),
            normal,
            t,
            material,
            surface: None,
        })
    }
}
