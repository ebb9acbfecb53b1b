//! Triangle mesh arrays.
//!
//! `MeshData` is validated on construction so the renderer can index into
//! it without bounds surprises. Normals are always present afterwards:
//! meshes supplied without them get smooth normals averaged from faces.

use caustica_math::{Aabb, Vec3};
use thiserror::Error;

/// Ways a mesh can be rejected at construction time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("mesh has no triangles")]
    Empty,

    #[error("index count {0} is not a multiple of 3")]
    IndexCountNotMultipleOfThree(usize),

    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("{normals} normals supplied for {positions} positions")]
    NormalCountMismatch { normals: usize, positions: usize },

    #[error("vertex {0} has a non-finite coordinate")]
    NonFinite(usize),
}

pub type MeshResult<T> = Result<T, MeshError>;

/// A mesh consisting of vertex positions, per-vertex normals and triangle indices.
#[derive(Clone, Debug)]
pub struct MeshData {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals, one per position
    pub normals: Vec<Vec3>,

    /// Triangle indices (every 3 indices form a triangle, counter-clockwise)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl MeshData {
    /// Validate the arrays and build a mesh.
    ///
    /// When `normals` is `None` smooth normals are computed from the faces.
    pub fn new(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        normals: Option<Vec<Vec3>>,
    ) -> MeshResult<Self> {
        if indices.is_empty() {
            return Err(MeshError::Empty);
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::IndexCountNotMultipleOfThree(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count: positions.len(),
            });
        }
        if let Some(vertex) = positions.iter().position(|p| !p.is_finite()) {
            return Err(MeshError::NonFinite(vertex));
        }

        let normals = match normals {
            Some(normals) if normals.len() != positions.len() => {
                return Err(MeshError::NormalCountMismatch {
                    normals: normals.len(),
                    positions: positions.len(),
                });
            }
            Some(normals) => normals,
            None => Self::compute_normals(&positions, &indices),
        };

        let bounds = Aabb::enclosing(positions.iter());
        log::debug!(
            "Mesh: {} vertices, {} triangles",
            positions.len(),
            indices.len() / 3
        );

        Ok(Self {
            positions,
            normals,
            indices,
            bounds,
        })
    }

    /// Compute smooth vertex normals by averaging face normals.
    ///
    /// Face normals are area weighted (unnormalized cross products). Vertices
    /// touched only by degenerate faces fall back to +Y.
    pub fn compute_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; positions.len()];

        for face in indices.chunks_exact(3) {
            let [i0, i1, i2] = [face[0] as usize, face[1] as usize, face[2] as usize];
            let (Some(&p0), Some(&p1), Some(&p2)) =
                (positions.get(i0), positions.get(i1), positions.get(i2))
            else {
                continue;
            };

            let face_normal = (p1 - p0).cross(p2 - p0);
            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        let mut degenerate = 0;
        for normal in &mut normals {
            let len = normal.length();
            if len > 0.0 {
                *normal /= len;
            } else {
                *normal = Vec3::Y;
                degenerate += 1;
            }
        }
        if degenerate > 0 {
            log::warn!("{} vertices have no well-defined normal, using +Y", degenerate);
        }

        normals
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex indices of triangle `i`.
    pub fn triangle(&self, i: usize) -> [usize; 3] {
        let face = &self.indices[i * 3..i * 3 + 3];
        [face[0] as usize, face[1] as usize, face[2] as usize]
    }

    /// Corner positions of triangle `i`.
    pub fn triangle_positions(&self, i: usize) -> [Vec3; 3] {
        self.triangle(i).map(|v| self.positions[v])
    }

    /// Area of triangle `i`.
    pub fn triangle_area(&self, i: usize) -> f32 {
        let [a, b, c] = self.triangle_positions(i);
        0.5 * (b - a).cross(c - a).length()
    }
}
