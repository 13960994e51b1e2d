//! Working representation shared by both reduction algorithms
//!
//! Vertices and faces live in arena-style arrays with liveness flags.
//! Nothing is physically removed mid-call: dead entries stay behind as
//! tombstones so that every index held elsewhere (incident-face lists, the
//! decimation frontier, cluster membership) remains stable. Incident-face
//! lists only ever grow; any consumer must filter them by face validity.

use decimesh_core::{Point3f, TriangleMesh, Vector3f, Vertex};
use itertools::Itertools;
use std::collections::BTreeSet;

/// A mutable vertex with a tombstone flag and an append-only list of
/// incident face indices.
#[derive(Debug, Clone)]
pub(crate) struct WorkingVertex {
    pub position: Point3f,
    /// Accumulated during extraction; meaningless before it.
    pub normal: Vector3f,
    pub alive: bool,
    /// May reference faces that have since been invalidated.
    pub incident_faces: Vec<usize>,
}

/// A mutable face. Once two of its indices coincide it is marked invalid
/// and excluded from all further processing and from output.
#[derive(Debug, Clone)]
pub(crate) struct WorkingFace {
    pub vertices: [usize; 3],
    pub valid: bool,
    /// Computed once at construction; never refreshed after mutation.
    pub normal: Vector3f,
}

/// The vertex/face arena one simplification call operates on.
#[derive(Debug, Clone)]
pub(crate) struct WorkingMesh {
    pub vertices: Vec<WorkingVertex>,
    pub faces: Vec<WorkingFace>,
}

/// Unit normal of the triangle `p0 p1 p2`, or zero if the triangle has no
/// area. A zero normal yields a zero plane quadric downstream.
pub(crate) fn triangle_normal(p0: &Point3f, p1: &Point3f, p2: &Point3f) -> Vector3f {
    let n = (p1 - p0).cross(&(p2 - p1));
    let len = n.magnitude();
    if len > 1e-12 {
        n / len
    } else {
        Vector3f::zeros()
    }
}

impl WorkingMesh {
    /// Build a fresh working representation from an input mesh.
    ///
    /// Faces that arrive degenerate (repeated indices) are tombstoned
    /// immediately so the collapse machinery never walks through them.
    pub fn build(mesh: &TriangleMesh) -> Self {
        let mut vertices: Vec<WorkingVertex> = mesh
            .vertices
            .iter()
            .map(|v| WorkingVertex {
                position: v.position,
                normal: Vector3f::zeros(),
                alive: true,
                incident_faces: Vec::new(),
            })
            .collect();

        let mut faces = Vec::with_capacity(mesh.triangle_count());
        for (fi, (&a, &b, &c)) in mesh.indices.iter().tuples().enumerate() {
            let tri = [a as usize, b as usize, c as usize];
            let normal = triangle_normal(
                &vertices[tri[0]].position,
                &vertices[tri[1]].position,
                &vertices[tri[2]].position,
            );
            let distinct = tri[0] != tri[1] && tri[1] != tri[2] && tri[2] != tri[0];
            faces.push(WorkingFace {
                vertices: tri,
                valid: distinct,
                normal,
            });
            for &v in &tri {
                vertices[v].incident_faces.push(fi);
            }
        }

        Self { vertices, faces }
    }

    /// Distinct neighbors of `v` reachable through its still-valid incident
    /// faces, in ascending index order. Invalid faces are skipped.
    pub fn neighbors(&self, v: usize) -> BTreeSet<usize> {
        let mut out = BTreeSet::new();
        for &fi in &self.vertices[v].incident_faces {
            let face = &self.faces[fi];
            if !face.valid {
                continue;
            }
            if let Some(slot) = face.vertices.iter().position(|&u| u == v) {
                out.insert(face.vertices[(slot + 1) % 3]);
                out.insert(face.vertices[(slot + 2) % 3]);
            }
        }
        out
    }

    pub fn live_vertex_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.alive).count()
    }

    pub fn valid_face_count(&self) -> usize {
        self.faces.iter().filter(|f| f.valid).count()
    }

    /// Rebuild per-vertex normals from the surviving faces and emit a flat,
    /// attribute-duplicated output mesh: three fresh vertices per face with
    /// sequentially increasing indices, no sharing across triangles.
    ///
    /// Normal accumulators are zeroed up front, so repeated extraction
    /// without an intervening mutation yields identical output.
    pub fn extract(&mut self) -> TriangleMesh {
        for v in &mut self.vertices {
            v.normal = Vector3f::zeros();
        }

        for fi in 0..self.faces.len() {
            if !self.faces[fi].valid {
                continue;
            }
            let [a, b, c] = self.faces[fi].vertices;
            let n = triangle_normal(
                &self.vertices[a].position,
                &self.vertices[b].position,
                &self.vertices[c].position,
            );
            for &v in &self.faces[fi].vertices {
                self.vertices[v].normal += n;
            }
        }

        for v in &mut self.vertices {
            if v.alive {
                let len = v.normal.magnitude();
                if len > 1e-12 {
                    v.normal /= len;
                }
            }
        }

        let mut out = TriangleMesh::new();
        for face in &self.faces {
            if !face.valid {
                continue;
            }
            for &vi in &face.vertices {
                let v = &self.vertices[vi];
                let index = out.add_vertex(Vertex {
                    position: v.position,
                    normal: v.normal,
                    tex_coords: [0.0, 0.0],
                }) as u32;
                out.indices.push(index);
            }
        }
        out
    }
}
