//! Plane cutting of triangle meshes.
//!
//! One call to [`cut_mesh`] classifies every triangle against the cutting
//! plane, splits straddling triangles along the intersection edge
//! (optionally subdividing them first for a smoother cut line), caps the
//! exposed cross-section, and assembles fresh output buffers for the
//! surviving side (and, on request, for the removed side as well).
//!
//! The pipeline is a single-pass, stateless transform: nothing outlives the
//! call, the source mesh is never mutated, and re-cutting the same mesh
//! with the same plane and parameters reproduces the same output. Per-
//! triangle work has no cross-triangle dependency, so it can optionally run
//! on the rayon thread pool; only the cap construction aggregates across
//! triangles.
//!
//! # Example
//!
//! ```
//! use mesh_cut::{cut_mesh, CutParams, Mesh, Plane, Vertex};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut mesh = Mesh::new();
//! mesh.vertices.push(Vertex::from_coords(0.0, -1.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(2.0, -1.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0));
//! mesh.faces.push([0, 1, 2]);
//!
//! let plane = Plane::new(Point3::origin(), Vector3::y()).unwrap();
//! let result = cut_mesh(&mesh, &plane, &CutParams::default()).unwrap();
//!
//! // The apex above y = 0 is gone; the quad below survives as 2 triangles.
//! assert_eq!(result.kept.unwrap().face_count(), 2);
//! ```

use nalgebra::{Point2, Point3};
use rayon::prelude::*;
use tracing::info;

use crate::assemble::{FinishOptions, MeshAccumulator};
use crate::cap::{fan_cap, ordered_boundary};
use crate::error::{MeshError, MeshResult};
use crate::plane::{classify, Plane, Side, TriangleClass};
use crate::subdivide::{subdivide_triangle, MAX_SUBDIVISION_LEVELS};
use crate::tracing_ext::OperationTimer;
use crate::types::{CutTriangle, CutVertex, Mesh};

/// Parameters for a plane cut.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "config-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CutParams {
    /// Which half-space is removed from the kept output.
    /// Default: `Side::Positive`
    pub hide_side: Side,

    /// Distances within this threshold of the plane snap to zero, and
    /// cut-edge points closer together than this are merged. Reduces
    /// jagged, degenerate splits from near-tangent triangles.
    /// Must be positive. Default: 1e-5
    pub edge_smoothing: f64,

    /// Subdivide large straddling triangles before splitting, so the cut
    /// boundary follows more, shorter chords.
    /// Default: false
    pub subdivide_intersecting: bool,

    /// Subdivision recursion depth, clamped to 1..=4.
    /// Default: 1
    pub subdivision_levels: u32,

    /// Straddling triangles with area at or below this are not subdivided.
    /// Must be positive. Default: 0.1
    pub subdivision_area_threshold: f64,

    /// Close the cut cross-section with a fan of cap triangles.
    /// Default: true
    pub fill_cut_holes: bool,

    /// Split fragments with area below this are dropped rather than
    /// emitted, avoiding near-zero slivers that cause shading artifacts.
    /// Must be positive. Default: 1e-12
    pub min_triangle_area: f64,

    /// Flip any emitted fragment whose geometric normal opposes the
    /// average of its vertex normals. Only applies when the source mesh
    /// carries normals.
    /// Default: true
    pub ensure_consistent_winding: bool,

    /// Recompute output normals from face geometry (uniform flat shading)
    /// instead of keeping interpolated vertex normals.
    /// Default: false
    pub recalculate_normals: bool,

    /// Recompute tangent vectors from UVs on the output meshes.
    /// Default: false
    pub recalculate_tangents: bool,

    /// Emit every output triangle twice, the copy with reversed winding,
    /// so the surface renders from both sides.
    /// Default: false
    pub double_sided: bool,

    /// Also assemble the removed half as its own mesh (with its own cap,
    /// facing the other way), instead of discarding it.
    /// Default: false
    pub keep_discarded: bool,

    /// Run the per-triangle classify/subdivide/split work on the rayon
    /// thread pool. Output is identical to the sequential pass.
    /// Default: false
    pub parallel: bool,
}

impl Default for CutParams {
    fn default() -> Self {
        Self {
            hide_side: Side::Positive,
            edge_smoothing: 1e-5,
            subdivide_intersecting: false,
            subdivision_levels: 1,
            subdivision_area_threshold: 0.1,
            fill_cut_holes: true,
            min_triangle_area: 1e-12,
            ensure_consistent_winding: true,
            recalculate_normals: false,
            recalculate_tangents: false,
            double_sided: false,
            keep_discarded: false,
            parallel: false,
        }
    }
}

impl CutParams {
    /// Parameters tuned for smooth cut edges: straddling triangles are
    /// subdivided twice before splitting.
    pub fn smooth_edges() -> Self {
        Self {
            subdivide_intersecting: true,
            subdivision_levels: 2,
            ..Default::default()
        }
    }

    /// Keep both halves of the cut, each capped watertight.
    pub fn both_sides() -> Self {
        Self {
            keep_discarded: true,
            ..Default::default()
        }
    }

    /// Discard interpolated normals and shade the output flat.
    pub fn flat_shaded() -> Self {
        Self {
            recalculate_normals: true,
            ..Default::default()
        }
    }

    /// Validate parameter ranges.
    pub fn validate(&self) -> MeshResult<()> {
        check_positive("edge_smoothing", self.edge_smoothing)?;
        check_positive(
            "subdivision_area_threshold",
            self.subdivision_area_threshold,
        )?;
        check_positive("min_triangle_area", self.min_triangle_area)?;
        Ok(())
    }

    fn effective_levels(&self) -> u32 {
        self.subdivision_levels.clamp(1, MAX_SUBDIVISION_LEVELS)
    }
}

fn check_positive(name: &'static str, value: f64) -> MeshResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(MeshError::InvalidParameter {
            name,
            value,
            requirement: "must be positive and finite",
        });
    }
    Ok(())
}

/// Counters describing what one cut did.
#[derive(Debug, Clone, Copy, Default)]
pub struct CutStats {
    /// Triangles kept whole on the surviving side.
    pub kept_whole: usize,
    /// Triangles removed whole with the hidden side.
    pub discarded_whole: usize,
    /// Source triangles that straddled the plane.
    pub straddling: usize,
    /// Triangles produced by pre-split subdivision.
    pub subdivision_children: usize,
    /// Split fragments emitted on the kept side.
    pub fragments_kept: usize,
    /// Split fragments emitted on the discarded side.
    pub fragments_discarded: usize,
    /// Near-zero fragments dropped by the degenerate guard.
    pub degenerate_dropped: usize,
    /// Fragments flipped by the winding guard.
    pub winding_flips: usize,
    /// Unique boundary points after merging.
    pub boundary_points: usize,
    /// Cap triangles emitted across both output meshes.
    pub cap_triangles: usize,
}

impl CutStats {
    fn merge(&mut self, other: &CutStats) {
        self.kept_whole += other.kept_whole;
        self.discarded_whole += other.discarded_whole;
        self.straddling += other.straddling;
        self.subdivision_children += other.subdivision_children;
        self.fragments_kept += other.fragments_kept;
        self.fragments_discarded += other.fragments_discarded;
        self.degenerate_dropped += other.degenerate_dropped;
        self.winding_flips += other.winding_flips;
    }
}

/// Output of one cut operation.
///
/// `None` on a side means no geometry survived there; the caller should
/// hide or deactivate the corresponding object rather than treat it as a
/// failure. Output meshes own freshly built buffers, sharing nothing with
/// the input.
#[derive(Debug)]
pub struct CutResult {
    /// The surviving side.
    pub kept: Option<Mesh>,
    /// The removed side, when `keep_discarded` was set.
    pub discarded: Option<Mesh>,
    /// Deduplicated cut-boundary points, ordered radially around their
    /// centroid. Empty when the plane did not cross the mesh silhouette.
    pub boundary: Vec<Point3<f64>>,
    /// Operation counters.
    pub stats: CutStats,
}

/// Per-face cut output, merged after the (optionally parallel) map.
#[derive(Default)]
struct FaceOutput {
    kept: Vec<CutTriangle>,
    discarded: Vec<CutTriangle>,
    edge_points: Vec<Point3<f64>>,
    stats: CutStats,
}

/// Cut a mesh against a plane.
///
/// Classifies every triangle, splits straddling ones along the plane with
/// interpolated attributes, optionally caps the exposed cross-section, and
/// assembles the surviving geometry into a fresh mesh. See [`CutParams`]
/// for the knobs.
///
/// The input mesh is only read; repeated cuts of the same stored original
/// are idempotent.
pub fn cut_mesh(mesh: &Mesh, plane: &Plane, params: &CutParams) -> MeshResult<CutResult> {
    params.validate()?;
    validate_source(mesh)?;

    let _timer = OperationTimer::with_context("cut_mesh", mesh.face_count(), mesh.vertex_count());

    let has_normals = mesh.has_normals();
    let has_uvs = mesh.has_uvs();

    let process = |face: &[u32; 3]| process_face(mesh, face, plane, params, has_normals);
    let outputs: Vec<FaceOutput> = if params.parallel {
        mesh.faces.par_iter().map(process).collect()
    } else {
        mesh.faces.iter().map(process).collect()
    };

    let mut kept_acc = MeshAccumulator::new(has_normals, has_uvs);
    let mut discarded_acc = MeshAccumulator::new(has_normals, has_uvs);
    let mut edge_points: Vec<Point3<f64>> = Vec::new();
    let mut stats = CutStats::default();

    for output in &outputs {
        kept_acc.extend(&output.kept);
        discarded_acc.extend(&output.discarded);
        edge_points.extend_from_slice(&output.edge_points);
        stats.merge(&output.stats);
    }

    // Cross-triangle aggregation: order the boundary once, cap each
    // requested side from it.
    let boundary = if edge_points.is_empty() {
        Vec::new()
    } else {
        ordered_boundary(&edge_points, plane, params.edge_smoothing)
    };
    stats.boundary_points = boundary.len();

    if params.fill_cut_holes && boundary.len() >= 3 {
        let kept_cap = fan_cap(&boundary, plane, params.hide_side, params.min_triangle_area);
        stats.cap_triangles += kept_cap.len();
        kept_acc.extend(&kept_cap);

        if params.keep_discarded {
            let discarded_cap = fan_cap(
                &boundary,
                plane,
                params.hide_side.opposite(),
                params.min_triangle_area,
            );
            stats.cap_triangles += discarded_cap.len();
            discarded_acc.extend(&discarded_cap);
        }
    }

    let finish = FinishOptions {
        recalculate_normals: params.recalculate_normals,
        recalculate_tangents: params.recalculate_tangents,
        double_sided: params.double_sided,
    };
    let kept = kept_acc.finish(&finish);
    let discarded = if params.keep_discarded {
        discarded_acc.finish(&finish)
    } else {
        None
    };

    info!(
        faces = mesh.face_count(),
        kept_whole = stats.kept_whole,
        discarded_whole = stats.discarded_whole,
        straddling = stats.straddling,
        boundary_points = stats.boundary_points,
        cap_triangles = stats.cap_triangles,
        "Cut complete"
    );

    Ok(CutResult {
        kept,
        discarded,
        boundary,
        stats,
    })
}

/// Validate the source mesh buffers before cutting.
///
/// An unreadable mesh aborts the operation for this mesh only; callers
/// cutting several meshes should log the error and continue with the rest.
fn validate_source(mesh: &Mesh) -> MeshResult<()> {
    if mesh.is_empty() {
        return Err(MeshError::EmptyMesh {
            details: format!(
                "{} vertices, {} faces",
                mesh.vertex_count(),
                mesh.face_count()
            ),
        });
    }

    for (vertex_index, vertex) in mesh.vertices.iter().enumerate() {
        let p = vertex.position;
        for (coordinate, value) in [("x", p.x), ("y", p.y), ("z", p.z)] {
            if !value.is_finite() {
                return Err(MeshError::InvalidCoordinate {
                    vertex_index,
                    coordinate,
                    value,
                });
            }
        }
    }

    let vertex_count = mesh.vertex_count();
    for (face_index, face) in mesh.faces.iter().enumerate() {
        for &vertex_index in face {
            if vertex_index as usize >= vertex_count {
                return Err(MeshError::InvalidVertexIndex {
                    face_index,
                    vertex_index,
                    vertex_count,
                });
            }
        }
    }

    Ok(())
}

/// Classify one source face and route it: whole to a side, or through
/// subdivision and splitting.
fn process_face(
    mesh: &Mesh,
    face: &[u32; 3],
    plane: &Plane,
    params: &CutParams,
    has_normals: bool,
) -> FaceOutput {
    let mut output = FaceOutput::default();
    let tri = detach_triangle(mesh, face);
    let distances = snapped_distances(&tri, plane, params.edge_smoothing);

    match classify(distances) {
        TriangleClass::Positive => {
            route_whole(&mut output, &tri, &distances, Side::Positive, params);
        }
        TriangleClass::Negative => {
            route_whole(&mut output, &tri, &distances, Side::Negative, params);
        }
        TriangleClass::Straddling => {
            output.stats.straddling += 1;

            let pieces = if params.subdivide_intersecting
                && tri.area() > params.subdivision_area_threshold
            {
                let children = subdivide_triangle(
                    &tri,
                    params.effective_levels(),
                    params.subdivision_area_threshold,
                );
                output.stats.subdivision_children += children.len();
                children
            } else {
                vec![tri]
            };

            for piece in &pieces {
                let d = snapped_distances(piece, plane, params.edge_smoothing);
                match classify(d) {
                    TriangleClass::Positive => {
                        route_whole(&mut output, piece, &d, Side::Positive, params);
                    }
                    TriangleClass::Negative => {
                        route_whole(&mut output, piece, &d, Side::Negative, params);
                    }
                    TriangleClass::Straddling => {
                        split_piece(&mut output, piece, &d, params, has_normals);
                    }
                }
            }
        }
    }

    output
}

/// Pull a face out of the index buffer as free-standing geometry.
///
/// Missing vertex normals fall back to the face normal; missing UVs fall
/// back to the origin. The assembler later drops attributes the source
/// never carried.
fn detach_triangle(mesh: &Mesh, face: &[u32; 3]) -> CutTriangle {
    let positions = [
        mesh.vertices[face[0] as usize].position,
        mesh.vertices[face[1] as usize].position,
        mesh.vertices[face[2] as usize].position,
    ];
    let face_normal = crate::types::Triangle::new(positions[0], positions[1], positions[2])
        .normal()
        .unwrap_or_else(nalgebra::Vector3::z);

    let vertex = |i: usize| {
        let v = &mesh.vertices[face[i] as usize];
        CutVertex::new(
            positions[i],
            v.normal.unwrap_or(face_normal),
            v.uv.unwrap_or_else(Point2::origin),
        )
    };
    CutTriangle::new(vertex(0), vertex(1), vertex(2))
}

fn snapped_distances(tri: &CutTriangle, plane: &Plane, smoothing: f64) -> [f64; 3] {
    [
        plane.snapped_distance(&tri.v[0].position, smoothing),
        plane.snapped_distance(&tri.v[1].position, smoothing),
        plane.snapped_distance(&tri.v[2].position, smoothing),
    ]
}

/// Send an unsplit triangle to the bucket for `side`, recording any of its
/// vertices that lie exactly on the plane: a kept face flush against the
/// cut contributes to the boundary even though it was never split.
fn route_whole(
    output: &mut FaceOutput,
    tri: &CutTriangle,
    distances: &[f64; 3],
    side: Side,
    params: &CutParams,
) {
    if params.fill_cut_holes {
        for (v, &d) in tri.v.iter().zip(distances) {
            if d == 0.0 {
                output.edge_points.push(v.position);
            }
        }
    }

    if side == params.hide_side {
        output.stats.discarded_whole += 1;
        if params.keep_discarded {
            output.discarded.push(*tri);
        }
    } else {
        output.stats.kept_whole += 1;
        output.kept.push(*tri);
    }
}

/// Split one straddling triangle along the plane.
///
/// Walks the triangle's edges in winding order, clipping against each
/// half-space: the side with the lone minority vertex yields one triangle,
/// the majority side yields a quad split along its `(p0, p2)` diagonal.
/// Intersection points and on-plane vertices feed the cap.
fn split_piece(
    output: &mut FaceOutput,
    tri: &CutTriangle,
    distances: &[f64; 3],
    params: &CutParams,
    has_normals: bool,
) {
    if params.fill_cut_holes {
        collect_edge_points(tri, distances, &mut output.edge_points);
    }

    let keep_positive = params.hide_side == Side::Negative;

    let kept_polygon = clip_side(tri, distances, keep_positive);
    emit_polygon(
        &kept_polygon,
        params,
        has_normals,
        &mut output.kept,
        &mut output.stats,
        true,
    );

    if params.keep_discarded {
        let discarded_polygon = clip_side(tri, distances, !keep_positive);
        emit_polygon(
            &discarded_polygon,
            params,
            has_normals,
            &mut output.discarded,
            &mut output.stats,
            false,
        );
    }
}

/// Record this triangle's contribution to the cut-edge vertex set: every
/// sign-crossing edge's intersection point plus every snapped on-plane
/// vertex.
fn collect_edge_points(tri: &CutTriangle, d: &[f64; 3], edge_points: &mut Vec<Point3<f64>>) {
    for i in 0..3 {
        if d[i] == 0.0 {
            edge_points.push(tri.v[i].position);
        }
        let j = (i + 1) % 3;
        if d[i] * d[j] < 0.0 {
            let t = d[i] / (d[i] - d[j]);
            let v = CutVertex::lerp(&tri.v[i], &tri.v[j], t);
            edge_points.push(v.position);
        }
    }
}

/// Clip a straddling triangle to one half-space.
///
/// Vertices on the kept side (including on-plane vertices) are emitted in
/// winding order; each strictly sign-crossing edge contributes its
/// interpolated intersection vertex. The result has 3 or 4 corners.
fn clip_side(tri: &CutTriangle, d: &[f64; 3], keep_positive: bool) -> Vec<CutVertex> {
    let mut polygon = Vec::with_capacity(4);
    for i in 0..3 {
        let on_side = if keep_positive { d[i] >= 0.0 } else { d[i] <= 0.0 };
        if on_side {
            polygon.push(tri.v[i]);
        }
        let j = (i + 1) % 3;
        if d[i] * d[j] < 0.0 {
            let t = d[i] / (d[i] - d[j]);
            polygon.push(CutVertex::lerp(&tri.v[i], &tri.v[j], t));
        }
    }
    polygon
}

/// Turn a clipped polygon into triangles, applying the degenerate and
/// winding guards.
fn emit_polygon(
    polygon: &[CutVertex],
    params: &CutParams,
    has_normals: bool,
    out: &mut Vec<CutTriangle>,
    stats: &mut CutStats,
    kept_side: bool,
) {
    // Collapse corners that the intersection placed within the smoothing
    // threshold of each other.
    let mut corners: Vec<CutVertex> = Vec::with_capacity(polygon.len());
    for v in polygon {
        let duplicate = corners
            .last()
            .map(|prev: &CutVertex| (prev.position - v.position).norm() <= params.edge_smoothing)
            .unwrap_or(false);
        if !duplicate {
            corners.push(*v);
        }
    }
    while corners.len() >= 2 {
        let first = corners[0].position;
        let last = corners[corners.len() - 1].position;
        if (first - last).norm() <= params.edge_smoothing {
            corners.pop();
        } else {
            break;
        }
    }

    if corners.len() < 3 {
        stats.degenerate_dropped += 1;
        return;
    }

    let candidates: &[[usize; 3]] = if corners.len() == 3 {
        &[[0, 1, 2]]
    } else {
        &[[0, 1, 2], [0, 2, 3]]
    };

    for &[a, b, c] in candidates {
        let mut tri = CutTriangle::new(corners[a], corners[b], corners[c]);
        if tri.area() < params.min_triangle_area {
            stats.degenerate_dropped += 1;
            continue;
        }

        if params.ensure_consistent_winding && has_normals {
            let shading = tri.v[0].normal + tri.v[1].normal + tri.v[2].normal;
            if tri.normal_unnormalized().dot(&shading) < 0.0 {
                tri.flip();
                stats.winding_flips += 1;
            }
        }

        if kept_side {
            stats.fragments_kept += 1;
        } else {
            stats.fragments_discarded += 1;
        }
        out.push(tri);
    }
}
