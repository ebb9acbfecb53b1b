//! Photon storage and radius queries.
//!
//! Photons are staged in a flat list while the photon pass runs and moved
//! into a kd-tree by [`PhotonMap::build`]. Queries see both.

use crate::material::Color;
use caustica_math::Vec3;
use kd_tree::{KdPoint, KdTreeN};

/// A packet of light deposited on a diffuse surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Photon {
    pub position: Vec3,
    /// Unit direction back towards where the photon came from
    pub direction: Vec3,
    pub flux: Color,
}

impl KdPoint for Photon {
    type Scalar = f32;
    type Dim = typenum::U3;

    fn at(&self, k: usize) -> f32 {
        self.position[k]
    }
}

/// Spatial index over stored photons.
#[derive(Default)]
pub struct PhotonMap {
    staged: Vec<Photon>,
    index: Option<KdTreeN<Photon, typenum::U3>>,
    indexed: usize,
}

impl PhotonMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a photon. It is found by queries right away and indexed by the
    /// next `build`.
    pub fn store(&mut self, photon: Photon) {
        self.staged.push(photon);
    }

    /// Move staged photons into the kd-tree.
    pub fn build(&mut self) {
        if self.staged.is_empty() {
            return;
        }

        let mut photons = std::mem::take(&mut self.staged);
        if let Some(index) = self.index.take() {
            photons.extend(index.iter().copied());
        }

        self.indexed = photons.len();
        self.index = Some(KdTreeN::build_by_ordered_float(photons));
    }

    /// All photons within `radius` of `point`.
    pub fn within_radius(&self, point: Vec3, radius: f32) -> Vec<&Photon> {
        let mut found = match &self.index {
            Some(index) => index.within_radius(&[point.x, point.y, point.z], radius),
            None => Vec::new(),
        };

        let r2 = radius * radius;
        found.extend(
            self.staged
                .iter()
                .filter(|p| p.position.distance_squared(point) <= r2),
        );
        found
    }

    pub fn len(&self) -> usize {
        self.indexed + self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Photons not yet moved into the kd-tree.
    pub fn pending(&self) -> usize {
        self.staged.len()
    }

    pub fn clear(&mut self) {
        self.staged.clear();
        self.index = None;
        self.indexed = 0;
    }
}
