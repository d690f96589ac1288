//! Fluent builder API for cut operations.
//!
//! # Example
//!
//! ```
//! use mesh_cut::{CutBuilder, Mesh, Plane, Side, Vertex};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut mesh = Mesh::new();
//! mesh.vertices.push(Vertex::from_coords(0.0, -1.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(2.0, -1.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0));
//! mesh.faces.push([0, 1, 2]);
//!
//! let result = CutBuilder::new(mesh)
//!     .plane(Plane::new(Point3::origin(), Vector3::y()).unwrap())
//!     .hide(Side::Positive)
//!     .smooth_edges(2)
//!     .keep_discarded(true)
//!     .execute()
//!     .unwrap();
//!
//! assert!(result.kept.is_some());
//! assert!(result.discarded.is_some());
//! ```

use crate::cut::{cut_mesh, CutParams, CutResult};
use crate::error::{MeshError, MeshResult};
use crate::plane::{Plane, Side};
use crate::types::Mesh;

/// Chainable configuration for a single cut.
///
/// Owns the mesh to cut; configuration methods adjust a [`CutParams`]
/// underneath, and [`execute`](CutBuilder::execute) runs the pipeline.
pub struct CutBuilder {
    mesh: Mesh,
    plane: Option<Plane>,
    params: CutParams,
}

impl CutBuilder {
    /// Start configuring a cut of `mesh`.
    pub fn new(mesh: Mesh) -> Self {
        Self {
            mesh,
            plane: None,
            params: CutParams::default(),
        }
    }

    /// Set the cutting plane. Required before [`execute`](CutBuilder::execute).
    pub fn plane(mut self, plane: Plane) -> Self {
        self.plane = Some(plane);
        self
    }

    /// Choose which half-space is removed.
    pub fn hide(mut self, side: Side) -> Self {
        self.params.hide_side = side;
        self
    }

    /// Snap/merge threshold for near-plane vertices and cut-edge points.
    pub fn edge_smoothing(mut self, threshold: f64) -> Self {
        self.params.edge_smoothing = threshold;
        self
    }

    /// Subdivide large straddling triangles `levels` deep before splitting.
    pub fn smooth_edges(mut self, levels: u32) -> Self {
        self.params.subdivide_intersecting = true;
        self.params.subdivision_levels = levels;
        self
    }

    /// Area above which straddling triangles are subdivided.
    pub fn subdivision_threshold(mut self, area: f64) -> Self {
        self.params.subdivision_area_threshold = area;
        self
    }

    /// Whether to cap the cut cross-section.
    pub fn fill_holes(mut self, fill: bool) -> Self {
        self.params.fill_cut_holes = fill;
        self
    }

    /// Minimum area for emitted split fragments.
    pub fn min_triangle_area(mut self, area: f64) -> Self {
        self.params.min_triangle_area = area;
        self
    }

    /// Enable or disable the winding-consistency guard.
    pub fn consistent_winding(mut self, enabled: bool) -> Self {
        self.params.ensure_consistent_winding = enabled;
        self
    }

    /// Recompute output normals for uniform flat shading.
    pub fn flat_shading(mut self) -> Self {
        self.params.recalculate_normals = true;
        self
    }

    /// Recompute tangents from UVs on the output.
    pub fn tangents(mut self, enabled: bool) -> Self {
        self.params.recalculate_tangents = enabled;
        self
    }

    /// Emit each output triangle from both sides.
    pub fn double_sided(mut self, enabled: bool) -> Self {
        self.params.double_sided = enabled;
        self
    }

    /// Also assemble the removed half as its own mesh.
    pub fn keep_discarded(mut self, enabled: bool) -> Self {
        self.params.keep_discarded = enabled;
        self
    }

    /// Run per-triangle work on the rayon thread pool.
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.params.parallel = enabled;
        self
    }

    /// Replace the accumulated configuration wholesale.
    pub fn with_params(mut self, params: CutParams) -> Self {
        self.params = params;
        self
    }

    /// Run the cut.
    pub fn execute(self) -> MeshResult<CutResult> {
        let plane = self.plane.ok_or(MeshError::MissingPlane)?;
        cut_mesh(&self.mesh, &plane, &self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vertex;
    use nalgebra::{Point3, Vector3};

    fn triangle_mesh() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, -1.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(2.0, -1.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        mesh
    }

    #[test]
    fn execute_without_plane_is_an_error() {
        let err = CutBuilder::new(triangle_mesh()).execute().unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::MissingPlane);
    }

    #[test]
    fn builder_matches_direct_call() {
        let plane = Plane::new(Point3::origin(), Vector3::y()).unwrap();

        let direct = cut_mesh(&triangle_mesh(), &plane, &CutParams::default()).unwrap();
        let built = CutBuilder::new(triangle_mesh())
            .plane(plane)
            .execute()
            .unwrap();

        assert_eq!(
            direct.kept.unwrap().face_count(),
            built.kept.unwrap().face_count()
        );
    }

    #[test]
    fn builder_configuration_reaches_the_pipeline() {
        let plane = Plane::new(Point3::origin(), Vector3::y()).unwrap();
        let result = CutBuilder::new(triangle_mesh())
            .plane(plane)
            .hide(Side::Negative)
            .fill_holes(false)
            .keep_discarded(true)
            .execute()
            .unwrap();

        // Hiding the negative side keeps the single apex triangle.
        assert_eq!(result.kept.unwrap().face_count(), 1);
        assert_eq!(result.discarded.unwrap().face_count(), 2);
        assert_eq!(result.stats.cap_triangles, 0);
    }
}
