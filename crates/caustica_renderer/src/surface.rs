//! Surface trait and the handles the scene hands out.

use crate::Ray;
use caustica_math::Vec3;

/// Handle to a material registered with a [`Scene`](crate::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub(crate) usize);

impl MaterialId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to a surface registered with a [`Scene`](crate::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub(crate) usize);

impl SurfaceId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A point sampled on a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub position: Vec3,
    pub normal: Vec3,
}

/// Geometry that rays can hit.
///
/// Surfaces are built once and only read while rendering, so they must be
/// shareable across worker threads.
pub trait Surface: Send + Sync {
    /// Intersect the ray with this surface.
    ///
    /// Installs the hit on the ray and returns true only when it is nearer
    /// than the hit the ray already carries.
    fn intersect(&self, ray: &mut Ray) -> bool;

    /// Map two uniform numbers in [0, 1) to a uniformly distributed point.
    fn sample_point(&self, u: f32, v: f32) -> SurfacePoint;

    /// Total surface area.
    fn area(&self) -> f32;

    /// Material of this surface.
    fn material(&self) -> MaterialId;
}
