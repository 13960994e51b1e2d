//! Triangle mesh data structures

use crate::point::*;
use serde::{Deserialize, Serialize};

/// An indexed triangle mesh with interleaved vertex attributes.
///
/// `indices` is a flat list of 0-based vertex indices, three per triangle.
/// An empty mesh (no vertices, no indices) is valid everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Create a mesh from vertices and a flat triangle index list
    pub fn from_vertices_and_indices(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Create a mesh from bare positions and a flat triangle index list,
    /// with default normals and texture coordinates.
    pub fn from_positions_and_indices(positions: Vec<Point3f>, indices: Vec<u32>) -> Self {
        Self {
            vertices: positions.into_iter().map(Vertex::from_position).collect(),
            indices,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Add a vertex to the mesh, returning its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a triangle to the mesh
    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}
