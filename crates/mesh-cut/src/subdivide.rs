//! Midpoint subdivision of straddling triangles.
//!
//! A triangle about to be split by the cutting plane can first be
//! subdivided at its edge midpoints, producing a denser intersection
//! polyline so the cut boundary and its cap follow the surface more
//! smoothly than a single coarse chord per original triangle.
//!
//! The caller gates entry on "straddles the plane"; this module gates on
//! triangle area and recursion depth. Children cover exactly the same area
//! as the parent, with no gaps or overlaps, so classification and splitting
//! of the children partitions the parent faithfully.

use crate::types::{CutTriangle, CutVertex};

/// Maximum supported recursion depth.
///
/// Depth 4 turns one triangle into up to 256 children, which is already far
/// past the point of visual improvement for cut edges.
pub const MAX_SUBDIVISION_LEVELS: u32 = 4;

/// Subdivide a triangle into up to `4^levels` children.
///
/// The triangle is split at its three edge midpoints into four children
/// (three corner triangles and one center triangle), with normals lerped
/// and re-normalized and UVs lerped at each midpoint. Recursion continues
/// on every child until `levels` reaches zero or a child's area drops to
/// `area_threshold` or below.
///
/// Returns the input triangle unchanged when it is already at or below the
/// area threshold. Winding order is preserved in every child.
pub fn subdivide_triangle(
    tri: &CutTriangle,
    levels: u32,
    area_threshold: f64,
) -> Vec<CutTriangle> {
    let levels = levels.min(MAX_SUBDIVISION_LEVELS);
    let mut out = Vec::with_capacity(4usize.pow(levels));
    subdivide_into(tri, levels, area_threshold, &mut out);
    out
}

fn subdivide_into(
    tri: &CutTriangle,
    levels: u32,
    area_threshold: f64,
    out: &mut Vec<CutTriangle>,
) {
    if levels == 0 || tri.area() <= area_threshold {
        out.push(*tri);
        return;
    }

    let [v0, v1, v2] = tri.v;
    let m01 = CutVertex::lerp(&v0, &v1, 0.5);
    let m12 = CutVertex::lerp(&v1, &v2, 0.5);
    let m20 = CutVertex::lerp(&v2, &v0, 0.5);

    // Three corner triangles plus the center triangle, all CCW.
    let children = [
        CutTriangle::new(v0, m01, m20),
        CutTriangle::new(m01, v1, m12),
        CutTriangle::new(m20, m12, v2),
        CutTriangle::new(m01, m12, m20),
    ];

    for child in &children {
        subdivide_into(child, levels - 1, area_threshold, out);
    }
}
