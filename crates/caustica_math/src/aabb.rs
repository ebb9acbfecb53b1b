use crate::{Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (octree).
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an empty AABB (contains nothing).
    pub fn empty() -> Self {
        Self {
            x: Interval::EMPTY,
            y: Interval::EMPTY,
            z: Interval::EMPTY,
        }
    }

    /// Create an AABB from two corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let x = Interval::new(a.x.min(b.x), a.x.max(b.x));
        let y = Interval::new(a.y.min(b.y), a.y.max(b.y));
        let z = Interval::new(a.z.min(b.z), a.z.max(b.z));

        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Smallest box containing every point, or `Aabb::empty()` for no points.
    pub fn enclosing<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        let mut any = false;

        for p in points {
            min = min.min(*p);
            max = max.max(*p);
            any = true;
        }

        if any {
            Self::from_points(min, max)
        } else {
            Self::empty()
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Get the centroid (center point) of the AABB.
    pub fn centroid(&self) -> Vec3 {
        Vec3::new(self.x.midpoint(), self.y.midpoint(), self.z.midpoint())
    }

    /// Half the box size along each axis.
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.x.size(), self.y.size(), self.z.size()) * 0.5
    }

    /// Returns one of the eight equal sub-boxes.
    ///
    /// Bit 0 of `i` selects the upper half along X, bit 1 along Y and
    /// bit 2 along Z.
    pub fn octant(&self, i: usize) -> Aabb {
        let center = self.centroid();
        let half = |interval: Interval, mid: f32, upper: bool| {
            if upper {
                Interval::new(mid, interval.max)
            } else {
                Interval::new(interval.min, mid)
            }
        };

        Aabb {
            x: half(self.x, center.x, i & 1 != 0),
            y: half(self.y, center.y, i & 2 != 0),
            z: half(self.z, center.z, i & 4 != 0),
        }
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Uses the slab method. Axes where the direction is zero divide to
    /// infinity and reduce to an inside/outside check on that slab.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let adinv = 1.0 / r.direction[axis];
            let mut t0 = (slab.min - r.origin[axis]) * adinv;
            let mut t1 = (slab.max - r.origin[axis]) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }

        true
    }

    /// Triangle/box overlap by the separating axis theorem.
    ///
    /// Tests the three box face normals, the triangle normal and the nine
    /// edge cross products. Touching counts as overlap.
    pub fn overlaps_triangle(&self, a: Vec3, b: Vec3, c: Vec3) -> bool {
        let center = self.centroid();
        let half = self.half_extents();
        let v = [a - center, b - center, c - center];

        // Box face normals
        let tri_min = v[0].min(v[1]).min(v[2]);
        let tri_max = v[0].max(v[1]).max(v[2]);
        if tri_min.cmpgt(half).any() || tri_max.cmplt(-half).any() {
            return false;
        }

        let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];

        // Triangle plane
        let normal = edges[0].cross(edges[1]);
        let distance = normal.dot(v[0]);
        if distance.abs() > half.dot(normal.abs()) {
            return false;
        }

        // Edge cross products
        for edge in edges {
            for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
                let sep = axis.cross(edge);
                if sep.length_squared() < 1e-12 {
                    continue;
                }
                let p0 = v[0].dot(sep);
                let p1 = v[1].dot(sep);
                let p2 = v[2].dot(sep);
                let radius = half.dot(sep.abs());
                if p0.min(p1).min(p2) > radius || p0.max(p1).max(p2) < -radius {
                    return false;
                }
            }
        }

        true
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        let delta = 0.0001;
        if self.x.size() < delta {
            self.x = self.x.expand(delta);
        }
        if self.y.size() < delta {
            self.y = self.y.expand(delta);
        }
        if self.z.size() < delta {
            self.z = self.z.expand(delta);
        }
    }
}
