//! Quadric error metrics
//!
//! Each face contributes the outer product of its implicit plane
//! coefficients (a, b, c, d) with themselves; a vertex quadric is the sum
//! over its incident faces. Quadrics stay additive under vertex merges, so
//! the combined error surface of a merged point set is just the sum of the
//! members' matrices.

use crate::working::WorkingMesh;
use decimesh_core::{Point3f, Vector3f};
use nalgebra::{Matrix4, RowVector4, Vector4};

/// Determinant threshold below which a pinned cluster quadric is treated as
/// singular (all members coplanar or coincident).
const SINGULAR_EPSILON: f64 = 1e-9;

/// Plane coefficients `ax + by + cz + d = 0` from a face's cached unit
/// normal and any one of its vertices: `d = -(a*x + b*y + c*z)`.
fn face_plane(normal: &Vector3f, point: &Point3f) -> Vector4<f64> {
    let (a, b, c) = (normal.x as f64, normal.y as f64, normal.z as f64);
    let d = -(a * point.x as f64 + b * point.y as f64 + c * point.z as f64);
    Vector4::new(a, b, c, d)
}

fn plane_quadric(p: &Vector4<f64>) -> Matrix4<f64> {
    let (a, b, c, d) = (p[0], p[1], p[2], p[3]);
    Matrix4::new(
        a * a, a * b, a * c, a * d,
        a * b, b * b, b * c, b * d,
        a * c, b * c, c * c, c * d,
        a * d, b * d, c * d, d * d,
    )
}

/// One quadric per vertex, accumulated from the current valid face set.
/// Rebuilt from scratch at the start of every simplification call.
pub(crate) fn vertex_quadrics(mesh: &WorkingMesh) -> Vec<Matrix4<f64>> {
    let mut quadrics = vec![Matrix4::zeros(); mesh.vertices.len()];
    for face in &mesh.faces {
        if !face.valid {
            continue;
        }
        let plane = face_plane(&face.normal, &mesh.vertices[face.vertices[0]].position);
        let q = plane_quadric(&plane);
        for &vi in &face.vertices {
            quadrics[vi] += q;
        }
    }
    quadrics
}

/// Quadric error of placing a point governed by `q` at `p`: the quadratic
/// form `p_h^T * q * p_h` for homogeneous `p_h = (x, y, z, 1)`.
pub(crate) fn error_at(q: &Matrix4<f64>, p: &Point3f) -> f64 {
    let v = Vector4::new(p.x as f64, p.y as f64, p.z as f64, 1.0);
    (v.transpose() * q * v)[0].max(0.0)
}

/// Position minimizing a summed cluster quadric, via the homogeneous-solve
/// trick: pin the last row to (0, 0, 0, 1), invert, and read the optimum
/// from the last column. Returns `None` when the pinned matrix is
/// ill-conditioned and the caller should fall back to the position mean.
pub(crate) fn minimizing_position(q_sum: &Matrix4<f64>) -> Option<Point3f> {
    let mut q = *q_sum;
    q.set_row(3, &RowVector4::new(0.0, 0.0, 0.0, 1.0));
    if q.determinant().abs() < SINGULAR_EPSILON {
        return None;
    }
    let inv = q.try_inverse()?;
    let p = Point3f::new(inv[(0, 3)] as f32, inv[(1, 3)] as f32, inv[(2, 3)] as f32);
    if p.x.is_finite() && p.y.is_finite() && p.z.is_finite() {
        Some(p)
    } else {
        None
    }
}
