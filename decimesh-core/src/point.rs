//! Point, vector and vertex types

use bytemuck::{Pod, Zeroable};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// An interleaved render-ready vertex: position, normal and texture
/// coordinates, laid out for direct GPU buffer upload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Vertex {
    pub position: Point3f,
    pub normal: Vector3f,
    pub tex_coords: [f32; 2],
}

unsafe impl Pod for Vertex {}
unsafe impl Zeroable for Vertex {}

impl Vertex {
    /// A vertex at `position` with a zero normal and placeholder texture
    /// coordinates.
    pub fn from_position(position: Point3f) -> Self {
        Self {
            position,
            normal: Vector3f::zeros(),
            tex_coords: [0.0, 0.0],
        }
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Point3f::origin(),
            normal: Vector3f::new(0.0, 0.0, 1.0),
            tex_coords: [0.0, 0.0],
        }
    }
}
