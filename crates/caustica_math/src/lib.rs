//! Caustica math - vector algebra and bounding volumes.
//!
//! Re-exports `glam` and adds the small set of geometric types the
//! renderer builds on: closed intervals, axis-aligned boxes and plain rays.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
