//! Caustica Core - renderer-agnostic scene data.
//!
//! This crate provides `MeshData`, the triangle-mesh arrays handed to the
//! renderer once a mesh has been parsed by some external loader, together
//! with the validation errors such input can produce.

pub mod mesh;

// Re-export commonly used types
pub use mesh::{MeshData, MeshError, MeshResult};
