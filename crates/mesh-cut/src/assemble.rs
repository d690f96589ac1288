//! Output mesh accumulation and finishing passes.
//!
//! The cut pipeline emits free-standing triangles in three streams (kept
//! whole, split fragments, cap); the accumulator collects them in emission
//! order into fresh vertex and index buffers. Every triangle appends three
//! new vertex slots; vertices are never welded across triangles, because
//! triangles adjacent to the cut carry interpolated normals and UVs that no
//! shared vertex could represent.

use nalgebra::Vector3;
use tracing::debug;

use crate::types::{CutTriangle, Mesh, Vertex};

/// Finishing passes applied when an accumulated mesh is built.
#[derive(Debug, Clone, Copy, Default)]
pub struct FinishOptions {
    /// Recompute normals from face geometry (uniform shading fallback).
    /// Also forced when the source mesh carried no normals.
    pub recalculate_normals: bool,
    /// Recompute tangent vectors from UVs for normal-mapped lighting.
    pub recalculate_tangents: bool,
    /// Emit every triangle twice, the copy with reversed winding and
    /// negated normals.
    pub double_sided: bool,
}

/// Accumulates cut output triangles into new mesh buffers.
#[derive(Debug)]
pub struct MeshAccumulator {
    mesh: Mesh,
    store_normals: bool,
    store_uvs: bool,
}

impl MeshAccumulator {
    /// Create an accumulator.
    ///
    /// `store_normals` / `store_uvs` mirror the source mesh: attributes the
    /// source never had are not invented on the way out (except normals,
    /// which the finishing pass can recompute).
    pub fn new(store_normals: bool, store_uvs: bool) -> Self {
        Self {
            mesh: Mesh::new(),
            store_normals,
            store_uvs,
        }
    }

    /// Number of triangles accumulated so far.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.mesh.faces.len()
    }

    /// Whether nothing has been accumulated.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mesh.faces.is_empty()
    }

    /// Append one triangle as three fresh vertex slots.
    pub fn push(&mut self, tri: &CutTriangle) {
        let base = self.mesh.vertices.len() as u32;
        for cv in &tri.v {
            self.mesh.vertices.push(Vertex {
                position: cv.position,
                normal: self.store_normals.then_some(cv.normal),
                uv: self.store_uvs.then_some(cv.uv),
                tangent: None,
            });
        }
        self.mesh.faces.push([base, base + 1, base + 2]);
    }

    /// Append every triangle in `tris`.
    pub fn extend<'a>(&mut self, tris: impl IntoIterator<Item = &'a CutTriangle>) {
        for tri in tris {
            self.push(tri);
        }
    }

    /// Build the final mesh, applying finishing passes.
    ///
    /// Returns `None` when zero triangles were accumulated. The caller
    /// treats that as "this side has no geometry, hide it", not as an
    /// error.
    pub fn finish(self, options: &FinishOptions) -> Option<Mesh> {
        if self.mesh.faces.is_empty() {
            return None;
        }

        let mut mesh = self.mesh;
        if options.recalculate_normals || !self.store_normals {
            compute_vertex_normals(&mut mesh);
        }
        if options.recalculate_tangents && mesh.has_uvs() {
            compute_tangents(&mut mesh);
        }
        if options.double_sided {
            make_double_sided(&mut mesh);
        }

        debug!(
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            "Assembled cut output mesh"
        );
        Some(mesh)
    }
}

/// Recompute vertex normals as the area-weighted average of incident face
/// normals.
///
/// On cut output (no shared vertices) every vertex has exactly one incident
/// face, so this degenerates to flat per-face shading, the uniform
/// fallback used when interpolated normals are unavailable.
pub fn compute_vertex_normals(mesh: &mut Mesh) {
    let mut accumulated = vec![Vector3::zeros(); mesh.vertices.len()];

    for &[i0, i1, i2] in &mesh.faces {
        let v0 = mesh.vertices[i0 as usize].position;
        let v1 = mesh.vertices[i1 as usize].position;
        let v2 = mesh.vertices[i2 as usize].position;
        // Cross product magnitude carries the area weighting.
        let face_normal = (v1 - v0).cross(&(v2 - v0));
        accumulated[i0 as usize] += face_normal;
        accumulated[i1 as usize] += face_normal;
        accumulated[i2 as usize] += face_normal;
    }

    for (vertex, normal) in mesh.vertices.iter_mut().zip(accumulated) {
        let len = normal.norm();
        vertex.normal = if len > f64::EPSILON {
            Some(normal / len)
        } else {
            None
        };
    }
}

/// Recompute tangent vectors from positions and UVs.
///
/// Uses the standard UV-derivative construction, accumulated per vertex and
/// orthonormalized against the vertex normal. Faces with degenerate UV area
/// contribute nothing; vertices left without a tangent get an arbitrary
/// direction perpendicular to their normal.
pub fn compute_tangents(mesh: &mut Mesh) {
    let mut accumulated = vec![Vector3::zeros(); mesh.vertices.len()];

    for &[i0, i1, i2] in &mesh.faces {
        let (p0, p1, p2) = (
            mesh.vertices[i0 as usize].position,
            mesh.vertices[i1 as usize].position,
            mesh.vertices[i2 as usize].position,
        );
        let (uv0, uv1, uv2) = match (
            mesh.vertices[i0 as usize].uv,
            mesh.vertices[i1 as usize].uv,
            mesh.vertices[i2 as usize].uv,
        ) {
            (Some(a), Some(b), Some(c)) => (a, b, c),
            _ => continue,
        };

        let e1 = p1 - p0;
        let e2 = p2 - p0;
        let du1 = uv1.x - uv0.x;
        let dv1 = uv1.y - uv0.y;
        let du2 = uv2.x - uv0.x;
        let dv2 = uv2.y - uv0.y;

        let det = du1 * dv2 - du2 * dv1;
        if det.abs() < f64::EPSILON {
            continue;
        }
        let tangent = (e1 * dv2 - e2 * dv1) / det;

        accumulated[i0 as usize] += tangent;
        accumulated[i1 as usize] += tangent;
        accumulated[i2 as usize] += tangent;
    }

    for (vertex, tangent) in mesh.vertices.iter_mut().zip(accumulated) {
        let normal = vertex.normal.unwrap_or_else(Vector3::z);
        // Gram-Schmidt against the normal.
        let ortho = tangent - normal * normal.dot(&tangent);
        let len = ortho.norm();
        vertex.tangent = Some(if len > f64::EPSILON {
            ortho / len
        } else {
            fallback_perpendicular(&normal)
        });
    }
}

/// Duplicate every triangle with reversed winding and negated normals so
/// both faces render.
pub fn make_double_sided(mesh: &mut Mesh) {
    let face_count = mesh.faces.len();
    mesh.vertices.reserve(face_count * 3);
    mesh.faces.reserve(face_count);

    for face_idx in 0..face_count {
        let [i0, i1, i2] = mesh.faces[face_idx];
        let base = mesh.vertices.len() as u32;
        // Reversed order flips the winding.
        for &i in &[i0, i2, i1] {
            let mut v = mesh.vertices[i as usize].clone();
            v.normal = v.normal.map(|n| -n);
            mesh.vertices.push(v);
        }
        mesh.faces.push([base, base + 1, base + 2]);
    }
}

fn fallback_perpendicular(normal: &Vector3<f64>) -> Vector3<f64> {
    let candidate = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let ortho = candidate - normal * normal.dot(&candidate);
    let len = ortho.norm();
    if len > f64::EPSILON {
        ortho / len
    } else {
        Vector3::x()
    }
}
