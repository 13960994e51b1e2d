//! Core data structures for decimesh
//!
//! This crate provides the shared types for mesh simplification: point and
//! vector aliases, the interleaved render-ready vertex, the triangle mesh
//! exchanged with loaders and renderers, and the common error type.

pub mod error;
pub mod mesh;
pub mod point;

pub use error::*;
pub use mesh::*;
pub use point::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix3, Matrix4, Point3, Vector3, Vector4};

// Type aliases for easier imports
pub type Mesh = TriangleMesh;
