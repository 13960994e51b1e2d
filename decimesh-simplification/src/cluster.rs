//! Uniform-grid vertex clustering
//!
//! Rossignac & Borrel style simplification: quantize bounding-box-normalized
//! vertex positions into a uniform grid and merge every multi-member cell
//! into a single quadric-optimal representative vertex, then drop the faces
//! that degenerate. Connectivity is ignored when forming clusters.

use crate::quadric;
use crate::working::{WorkingMesh, WorkingVertex};
use decimesh_core::{Point3f, Vector3f};
use nalgebra::Matrix4;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy)]
struct Aabb {
    min: [f64; 3],
    max: [f64; 3],
}

impl Aabb {
    /// Bounds over the live vertices; `None` when there are none.
    fn from_live_vertices(mesh: &WorkingMesh) -> Option<Self> {
        let mut min = [f64::MAX; 3];
        let mut max = [f64::MIN; 3];
        let mut any = false;
        for vert in mesh.vertices.iter().filter(|v| v.alive) {
            any = true;
            let p = [
                vert.position.x as f64,
                vert.position.y as f64,
                vert.position.z as f64,
            ];
            for i in 0..3 {
                if p[i] < min[i] {
                    min[i] = p[i];
                }
                if p[i] > max[i] {
                    max[i] = p[i];
                }
            }
        }
        any.then_some(Aabb { min, max })
    }

    /// Largest axis extent; the uniform normalization scale.
    fn max_extent(&self) -> f64 {
        (0..3)
            .map(|i| self.max[i] - self.min[i])
            .fold(0.0, f64::max)
    }
}

/// Quantize one axis offset inside the normalized box. The far box boundary
/// is clamped into the last cell rather than starting a cell of its own.
fn cell_coord(offset: f64, extent: f64, resolution: u32) -> i64 {
    if extent <= 0.0 {
        return 0;
    }
    let cell = (offset / extent * resolution as f64).floor() as i64;
    cell.clamp(0, resolution as i64 - 1)
}

/// Group live vertex indices by grid cell. The `BTreeMap` fixes the merge
/// order, keeping repeated runs byte-identical.
fn assign_cells(
    mesh: &WorkingMesh,
    bbox: &Aabb,
    extent: f64,
    resolution: u32,
) -> BTreeMap<(i64, i64, i64), Vec<usize>> {
    let mut cells: BTreeMap<(i64, i64, i64), Vec<usize>> = BTreeMap::new();
    for (vi, vert) in mesh.vertices.iter().enumerate() {
        if !vert.alive {
            continue;
        }
        let key = (
            cell_coord(vert.position.x as f64 - bbox.min[0], extent, resolution),
            cell_coord(vert.position.y as f64 - bbox.min[1], extent, resolution),
            cell_coord(vert.position.z as f64 - bbox.min[2], extent, resolution),
        );
        cells.entry(key).or_default().push(vi);
    }
    cells
}

/// Merge one multi-member cell: tombstone the members, redirect their
/// incident faces to a freshly appended representative vertex placed at the
/// minimum of the summed quadric (or the member mean when that system is
/// singular). Degeneracy is not checked here; `run` sweeps faces afterwards.
fn merge_cell(mesh: &mut WorkingMesh, quadrics: &[Matrix4<f64>], members: &[usize]) {
    let representative = mesh.vertices.len();

    let mut q_sum = Matrix4::zeros();
    let mut mean = Vector3f::zeros();
    let mut incident = Vec::new();
    for &vi in members {
        q_sum += quadrics[vi];
        mean += mesh.vertices[vi].position.coords;
        mesh.vertices[vi].alive = false;
        let faces = mesh.vertices[vi].incident_faces.clone();
        for fi in faces {
            let mut redirected = false;
            for slot in mesh.faces[fi].vertices.iter_mut() {
                if *slot == vi {
                    *slot = representative;
                    redirected = true;
                }
            }
            if redirected {
                incident.push(fi);
            }
        }
    }

    let position = quadric::minimizing_position(&q_sum)
        .unwrap_or_else(|| Point3f::from(mean / members.len() as f32));

    mesh.vertices.push(WorkingVertex {
        position,
        normal: Vector3f::zeros(),
        alive: true,
        incident_faces: incident,
    });
}

/// Cluster live vertices on a uniform grid with `resolution` cells across
/// the longest normalized axis. `resolution` has been validated by the
/// caller. Grid assignment works on normalized coordinates; the geometry
/// itself keeps the input scale.
pub(crate) fn run(mesh: &mut WorkingMesh, resolution: u32) {
    let bbox = match Aabb::from_live_vertices(mesh) {
        Some(bbox) => bbox,
        None => return,
    };
    let quadrics = quadric::vertex_quadrics(mesh);
    let extent = bbox.max_extent();

    let cells = assign_cells(mesh, &bbox, extent, resolution);
    for members in cells.values() {
        if members.len() < 2 {
            continue;
        }
        merge_cell(mesh, &quadrics, members);
    }

    // A merge can leave a face referencing the same representative twice
    for face in &mut mesh.faces {
        let [a, b, c] = face.vertices;
        if a == b || b == c || c == a {
            face.valid = false;
        }
    }
}
