//! Iterative edge-collapse decimation
//!
//! Keeps one cheapest outgoing collapse candidate per live vertex in a keyed
//! priority queue, repeatedly performs the globally cheapest collapse, and
//! repairs the affected neighborhood before touching the queue again. The
//! queue supports exact removal and in-place priority update by source
//! vertex, so no stale entry ever reaches a collapse.

use crate::quadric::{self, error_at};
use crate::working::WorkingMesh;
use nalgebra::Matrix4;
use priority_queue::PriorityQueue;
use std::cmp::Ordering;

/// The cheapest outgoing half-edge collapse of one source vertex.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    cost: f64,
    source: usize,
    target: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    // Min-queue: smallest cost pops first, ties to the lowest source index
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.source.cmp(&self.source))
    }
}

/// Cheapest collapse of `v` onto one of its live neighbors, evaluating `v`'s
/// own quadric at each neighbor's position. Neighbors are scanned in
/// ascending index order, so equal costs resolve to the lowest index.
/// `None` when `v` has no valid incident face left.
fn select_edge(mesh: &WorkingMesh, quadrics: &[Matrix4<f64>], v: usize) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for u in mesh.neighbors(v) {
        let cost = error_at(&quadrics[v], &mesh.vertices[u].position);
        if best.map_or(true, |b| cost < b.cost) {
            best = Some(Candidate {
                cost,
                source: v,
                target: u,
            });
        }
    }
    best
}

/// Collapse `from` into `to`: tombstone `from`, redirect its incident faces
/// to `to`, and invalidate any face that would then reference `to` twice.
fn collapse(mesh: &mut WorkingMesh, from: usize, to: usize) {
    mesh.vertices[from].alive = false;
    let incident = mesh.vertices[from].incident_faces.clone();
    for fi in incident {
        if !mesh.faces[fi].valid {
            continue;
        }
        if mesh.faces[fi].vertices.contains(&to) {
            mesh.faces[fi].valid = false;
            continue;
        }
        let mut redirected = false;
        for slot in mesh.faces[fi].vertices.iter_mut() {
            if *slot == from {
                *slot = to;
                redirected = true;
            }
        }
        if redirected {
            mesh.vertices[to].incident_faces.push(fi);
        }
    }
}

/// Collapse cheapest edges until at most `floor(vertex_count * fraction)`
/// frontier entries remain (never below one). `fraction` has been validated
/// by the caller. Returns the final frontier size.
pub(crate) fn run(mesh: &mut WorkingMesh, fraction: f32) -> usize {
    let mut quadrics = quadric::vertex_quadrics(mesh);
    let target = ((mesh.vertices.len() as f64 * fraction as f64).floor() as usize).max(1);

    // One candidate per vertex that has at least one live neighbor;
    // isolated vertices never enter the frontier.
    let mut frontier: PriorityQueue<usize, Candidate> = PriorityQueue::new();
    for v in 0..mesh.vertices.len() {
        if !mesh.vertices[v].alive {
            continue;
        }
        if let Some(candidate) = select_edge(mesh, &quadrics, v) {
            frontier.push(v, candidate);
        }
    }

    while frontier.len() > target {
        let (from, candidate) = match frontier.pop() {
            Some(entry) => entry,
            None => break,
        };
        let to = candidate.target;

        // Every vertex whose cheapest candidate can go stale under this
        // collapse is a current neighbor of `from` (including `to`).
        let affected = mesh.neighbors(from);

        collapse(mesh, from, to);
        let from_quadric = quadrics[from];
        quadrics[to] += from_quadric;

        for v in affected {
            match select_edge(mesh, &quadrics, v) {
                Some(candidate) => {
                    frontier.push(v, candidate);
                }
                None => {
                    frontier.remove(&v);
                }
            }
        }
    }

    frontier.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use decimesh_core::{Point3f, TriangleMesh};
    use std::collections::BTreeSet;

    fn make_cube() -> TriangleMesh {
        let positions = vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(1.0, 1.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(0.0, 0.0, 1.0),
            Point3f::new(1.0, 0.0, 1.0),
            Point3f::new(1.0, 1.0, 1.0),
            Point3f::new(0.0, 1.0, 1.0),
        ];
        let indices = vec![
            0, 2, 1, 0, 3, 2, // bottom
            4, 5, 6, 4, 6, 7, // top
            0, 1, 5, 0, 5, 4, // front
            2, 3, 7, 2, 7, 6, // back
            1, 2, 6, 1, 6, 5, // right
            3, 0, 4, 3, 4, 7, // left
        ];
        TriangleMesh::from_positions_and_indices(positions, indices)
    }

    fn make_plane_grid(size: usize) -> TriangleMesh {
        let mut positions = Vec::new();
        for y in 0..size {
            for x in 0..size {
                positions.push(Point3f::new(x as f32, y as f32, 0.0));
            }
        }
        let mut indices = Vec::new();
        for y in 0..(size - 1) {
            for x in 0..(size - 1) {
                let tl = (y * size + x) as u32;
                let tr = tl + 1;
                let bl = ((y + 1) * size + x) as u32;
                let br = bl + 1;
                indices.extend_from_slice(&[tl, bl, tr]);
                indices.extend_from_slice(&[tr, bl, br]);
            }
        }
        TriangleMesh::from_positions_and_indices(positions, indices)
    }

    fn referenced_vertices(mesh: &WorkingMesh) -> BTreeSet<usize> {
        let mut out = BTreeSet::new();
        for face in &mesh.faces {
            if face.valid {
                out.extend(face.vertices);
            }
        }
        out
    }

    fn assert_no_dangling(mesh: &WorkingMesh) {
        for face in &mesh.faces {
            if face.valid {
                for &v in &face.vertices {
                    assert!(mesh.vertices[v].alive, "valid face references dead vertex {v}");
                }
            }
        }
    }

    #[test]
    fn test_candidate_ordering() {
        let mut queue: PriorityQueue<usize, Candidate> = PriorityQueue::new();
        queue.push(7, Candidate { cost: 2.0, source: 7, target: 0 });
        queue.push(3, Candidate { cost: 0.5, source: 3, target: 0 });
        queue.push(5, Candidate { cost: 0.5, source: 5, target: 0 });
        // Cheapest first; equal costs break toward the lower source index
        assert_eq!(queue.pop().unwrap().0, 3);
        assert_eq!(queue.pop().unwrap().0, 5);
        assert_eq!(queue.pop().unwrap().0, 7);
    }

    #[test]
    fn test_select_edge_prefers_lowest_index_on_ties() {
        // Planar grid: every neighbor position has zero cost against a
        // coplanar quadric, so the tie-break picks the lowest index.
        let working = WorkingMesh::build(&make_plane_grid(3));
        let quadrics = quadric::vertex_quadrics(&working);
        let candidate = select_edge(&working, &quadrics, 4).unwrap();
        assert_eq!(candidate.source, 4);
        assert_eq!(candidate.target, 1);
        assert_relative_eq!(candidate.cost, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_select_edge_isolated_vertex() {
        let mesh = TriangleMesh::from_positions_and_indices(
            vec![Point3f::origin(), Point3f::new(1.0, 0.0, 0.0)],
            vec![],
        );
        let working = WorkingMesh::build(&mesh);
        let quadrics = quadric::vertex_quadrics(&working);
        assert!(select_edge(&working, &quadrics, 0).is_none());
    }

    #[test]
    fn test_collapse_redirects_and_invalidates() {
        let working_mesh = make_plane_grid(2);
        let mut working = WorkingMesh::build(&working_mesh);
        // Faces: [0, 2, 1] and [1, 2, 3]; collapse 3 into 2
        collapse(&mut working, 3, 2);
        assert!(!working.vertices[3].alive);
        assert!(working.faces[0].valid);
        assert!(!working.faces[1].valid, "face sharing the edge degenerates");
        assert_no_dangling(&working);
    }

    #[test]
    fn test_cube_halved_terminates_at_four() {
        let mut working = WorkingMesh::build(&make_cube());
        let frontier = run(&mut working, 0.5);
        assert_eq!(frontier, 4);
        assert_eq!(working.live_vertex_count(), 4);
        assert_no_dangling(&working);
    }

    #[test]
    fn test_vertex_count_monotonicity() {
        let original = make_plane_grid(5);
        let mut working = WorkingMesh::build(&original);
        let before = working.live_vertex_count();
        let frontier = run(&mut working, 0.4);
        let target = (original.vertex_count() as f64 * 0.4).floor() as usize;

        assert!(frontier <= target);
        assert!(working.live_vertex_count() <= before);
        assert!(referenced_vertices(&working).len() <= before);
        assert_no_dangling(&working);
    }

    #[test]
    fn test_full_fraction_is_a_no_op() {
        let mut working = WorkingMesh::build(&make_cube());
        let frontier = run(&mut working, 1.0);
        assert_eq!(frontier, 8);
        assert_eq!(working.live_vertex_count(), 8);
        assert_eq!(working.valid_face_count(), 12);
    }

    #[test]
    fn test_tiny_fraction_stops_at_one() {
        // floor(9 * 0.01) = 0, floored to a single surviving frontier entry
        let mut working = WorkingMesh::build(&make_plane_grid(3));
        let frontier = run(&mut working, 0.01);
        assert!(frontier <= 1);
        assert_no_dangling(&working);
    }

    #[test]
    fn test_empty_mesh_is_a_no_op() {
        let mut working = WorkingMesh::build(&TriangleMesh::new());
        assert_eq!(run(&mut working, 0.5), 0);
    }

    #[test]
    fn test_collapsed_planar_patch_keeps_zero_plane_error() {
        // Decimating a coplanar patch accumulates member quadrics into the
        // survivors; their error on the original plane stays zero.
        let mut working = WorkingMesh::build(&make_plane_grid(3));
        run(&mut working, 0.25);
        let quadrics = quadric::vertex_quadrics(&working);
        for (vi, vert) in working.vertices.iter().enumerate() {
            if vert.alive {
                assert_relative_eq!(
                    error_at(&quadrics[vi], &vert.position),
                    0.0,
                    epsilon = 1e-6
                );
            }
        }
    }
}
