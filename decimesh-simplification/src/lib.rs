//! Mesh simplification algorithms
//!
//! This crate reduces the polygon count of a triangulated surface while
//! preserving its shape, with two interchangeable strategies:
//! - iterative edge collapse guided by quadric error metrics (QEM)
//! - uniform-grid vertex clustering with quadric-optimal representatives
//!
//! Both operate on a tombstoned working copy of the input mesh and emit a
//! flat, attribute-duplicated output mesh ready for rendering.

mod cluster;
mod decimate;
mod quadric;
mod working;

use decimesh_core::{Error, Result, TriangleMesh};
use working::WorkingMesh;

/// Simplification engine over one input mesh.
///
/// [`decimate`](Simplifier::decimate) and
/// [`cluster`](Simplifier::cluster) are mutually exclusive per invocation:
/// each rebuilds the working representation from the stored input mesh, so
/// repeated calls always start from the original geometry. The engine owns
/// its state exclusively; independent engines are safe to run on separate
/// threads.
pub struct Simplifier {
    mesh: TriangleMesh,
    working: WorkingMesh,
}

impl Simplifier {
    /// Create an engine for `mesh`.
    ///
    /// The index list must have a length divisible by three and reference
    /// only existing vertices; an empty mesh is valid.
    pub fn new(mesh: &TriangleMesh) -> Result<Self> {
        if mesh.indices.len() % 3 != 0 {
            return Err(Error::InvalidData(format!(
                "index count {} is not a multiple of 3",
                mesh.indices.len()
            )));
        }
        let limit = mesh.vertices.len() as u32;
        if let Some(&bad) = mesh.indices.iter().find(|&&i| i >= limit) {
            return Err(Error::InvalidData(format!(
                "index {bad} out of range for {} vertices",
                mesh.vertices.len()
            )));
        }
        Ok(Self {
            working: WorkingMesh::build(mesh),
            mesh: mesh.clone(),
        })
    }

    /// Collapse cheapest edges until the live vertex count reaches
    /// `floor(vertex_count * fraction)` (never below one).
    ///
    /// `fraction` outside `(0, 1]` is rejected before anything is mutated.
    pub fn decimate(&mut self, fraction: f32) -> Result<()> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(Error::Configuration(format!(
                "decimation fraction must be in (0, 1], got {fraction}"
            )));
        }
        self.working = WorkingMesh::build(&self.mesh);
        decimate::run(&mut self.working, fraction);
        Ok(())
    }

    /// Merge vertices on a uniform grid with `resolution` cells across the
    /// longest axis of the bounding box.
    ///
    /// A zero `resolution` is rejected before anything is mutated.
    pub fn cluster(&mut self, resolution: u32) -> Result<()> {
        if resolution == 0 {
            return Err(Error::Configuration(
                "clustering resolution must be at least 1".to_string(),
            ));
        }
        self.working = WorkingMesh::build(&self.mesh);
        cluster::run(&mut self.working, resolution);
        Ok(())
    }

    /// Rebuild per-vertex normals from the surviving faces and emit the
    /// output mesh. Repeated extraction without an intervening `decimate` or
    /// `cluster` call produces identical output.
    pub fn extract(&mut self) -> TriangleMesh {
        self.working.extract()
    }
}

/// Simplify a mesh in one shot with a preconfigured strategy.
pub trait MeshSimplifier {
    fn simplify(&self, mesh: &TriangleMesh) -> Result<TriangleMesh>;
}

/// QEM edge-collapse decimation toward a vertex-count fraction.
pub struct QuadricDecimation {
    /// Surviving fraction of the original vertex count, in `(0, 1]`.
    pub fraction: f32,
}

impl MeshSimplifier for QuadricDecimation {
    fn simplify(&self, mesh: &TriangleMesh) -> Result<TriangleMesh> {
        let mut engine = Simplifier::new(mesh)?;
        engine.decimate(self.fraction)?;
        Ok(engine.extract())
    }
}

/// Uniform-grid vertex clustering at a fixed grid resolution.
pub struct GridClustering {
    /// Number of grid cells across the longest normalized axis.
    pub resolution: u32,
}

impl MeshSimplifier for GridClustering {
    fn simplify(&self, mesh: &TriangleMesh) -> Result<TriangleMesh> {
        let mut engine = Simplifier::new(mesh)?;
        engine.cluster(self.resolution)?;
        Ok(engine.extract())
    }
}
