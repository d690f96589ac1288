//! Cap construction for the cross-section exposed by a cut.
//!
//! Every straddling triangle contributes its intersection points with the
//! plane; this module turns that point soup into cap geometry: deduplicate
//! near-coincident points, order them radially around their centroid in the
//! plane, then fan one triangle per consecutive boundary pair from the
//! centroid (an N-point loop caps with exactly N triangles).
//!
//! The radial ordering only produces a simple, non-self-intersecting
//! polygon for star-shaped cross-sections. A cut yielding a concave outline
//! or multiple disjoint loops may cap with overlapping triangles; this is a
//! known limitation, kept rather than silently papered over.

use hashbrown::HashMap;
use nalgebra::{Point2, Point3};
use tracing::debug;

use crate::plane::{Plane, Side};
use crate::types::{CutTriangle, CutVertex};

/// Remove points that lie within `tolerance` of an already-kept point.
///
/// Keeps the first occurrence; order of survivors follows input order.
pub fn dedup_points(points: &[Point3<f64>], tolerance: f64) -> Vec<Point3<f64>> {
    if points.is_empty() {
        return Vec::new();
    }

    let cell = tolerance.max(f64::MIN_POSITIVE);
    let key = |p: &Point3<f64>| -> (i64, i64, i64) {
        (
            (p.x / cell).floor() as i64,
            (p.y / cell).floor() as i64,
            (p.z / cell).floor() as i64,
        )
    };

    let mut grid: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
    let mut unique: Vec<Point3<f64>> = Vec::new();
    let tol_sq = tolerance * tolerance;

    'next_point: for p in points {
        let (kx, ky, kz) = key(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(indices) = grid.get(&(kx + dx, ky + dy, kz + dz)) {
                        for &i in indices {
                            if (unique[i] - p).norm_squared() <= tol_sq {
                                continue 'next_point;
                            }
                        }
                    }
                }
            }
        }
        grid.entry((kx, ky, kz)).or_default().push(unique.len());
        unique.push(*p);
    }

    unique
}

/// Deduplicate cut-edge points and order them radially around their
/// centroid in the plane.
///
/// Returns fewer than 3 points when the cut produced no visible hole; the
/// caller skips cap generation in that case.
pub fn ordered_boundary(
    points: &[Point3<f64>],
    plane: &Plane,
    merge_tolerance: f64,
) -> Vec<Point3<f64>> {
    let mut unique = dedup_points(points, merge_tolerance);
    if unique.len() < 3 {
        return unique;
    }

    let centroid = centroid_of(&unique);
    let (u, v) = plane.basis();

    unique.sort_by(|a, b| {
        let ra = a - centroid;
        let rb = b - centroid;
        let angle_a = ra.dot(&v).atan2(ra.dot(&u));
        let angle_b = rb.dot(&v).atan2(rb.dot(&u));
        angle_a
            .partial_cmp(&angle_b)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    unique
}

/// Build cap triangles closing the cut cross-section.
///
/// `facing` is the half-space the finished cap must face: for a kept mesh
/// this is the hidden side, so the cap points outward from the surviving
/// solid. Triangles whose geometric normal opposes the facing direction are
/// flipped. Cap vertices get the facing direction as their normal and
/// in-plane coordinates relative to the centroid as UVs.
///
/// Returns an empty list when fewer than 3 unique boundary points exist,
/// the expected case when the plane does not fully cross the mesh
/// silhouette.
pub fn fill_cap(
    points: &[Point3<f64>],
    plane: &Plane,
    facing: Side,
    merge_tolerance: f64,
    min_triangle_area: f64,
) -> Vec<CutTriangle> {
    let boundary = ordered_boundary(points, plane, merge_tolerance);
    fan_cap(&boundary, plane, facing, min_triangle_area)
}

/// Fan-triangulate an already-ordered boundary loop from its centroid.
///
/// Callers that need the ordered boundary for other purposes (measurement,
/// diagnostics) can run [`ordered_boundary`] once and feed it here.
pub fn fan_cap(
    boundary: &[Point3<f64>],
    plane: &Plane,
    facing: Side,
    min_triangle_area: f64,
) -> Vec<CutTriangle> {
    if boundary.len() < 3 {
        debug!(
            unique = boundary.len(),
            "Skipping cap: fewer than 3 unique boundary points"
        );
        return Vec::new();
    }

    let centroid = centroid_of(boundary);
    let cap_normal = plane.normal() * facing.sign();
    let (u, v) = plane.basis();
    let uv_of = |p: &Point3<f64>| -> Point2<f64> {
        let rel = p - centroid;
        Point2::new(rel.dot(&u), rel.dot(&v))
    };

    let center = CutVertex::new(centroid, cap_normal, Point2::origin());
    let n = boundary.len();
    let mut cap = Vec::with_capacity(n);

    for i in 0..n {
        let a = boundary[i];
        let b = boundary[(i + 1) % n];
        let mut tri = CutTriangle::new(
            center,
            CutVertex::new(a, cap_normal, uv_of(&a)),
            CutVertex::new(b, cap_normal, uv_of(&b)),
        );

        if tri.area() < min_triangle_area {
            continue;
        }
        if tri.normal_unnormalized().dot(&cap_normal) < 0.0 {
            tri.flip();
        }
        cap.push(tri);
    }

    debug!(
        boundary = n,
        triangles = cap.len(),
        "Filled cut cross-section"
    );

    cap
}

fn centroid_of(points: &[Point3<f64>]) -> Point3<f64> {
    let sum = points
        .iter()
        .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn y_plane() -> Plane {
        Plane::new(Point3::origin(), Vector3::y()).unwrap()
    }

    /// The four corners of a unit square in the y = 0 plane, shuffled, with
    /// near-duplicates mixed in.
    fn square_points() -> Vec<Point3<f64>> {
        vec![
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0 + 1e-8, 0.0, 1.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, 1e-9),
        ]
    }

    #[test]
    fn dedup_merges_near_coincident_points() {
        let unique = dedup_points(&square_points(), 1e-5);
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn dedup_keeps_distinct_points() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert_eq!(dedup_points(&points, 1e-5).len(), 3);
    }

    #[test]
    fn boundary_orders_points_radially() {
        let boundary = ordered_boundary(&square_points(), &y_plane(), 1e-5);
        assert_eq!(boundary.len(), 4);

        // Consecutive boundary points must be square-edge neighbors, never
        // the diagonal.
        for i in 0..4 {
            let a = boundary[i];
            let b = boundary[(i + 1) % 4];
            assert!(
                ((a - b).norm() - 1.0).abs() < 1e-6,
                "non-adjacent points {a:?} -> {b:?}"
            );
        }
    }

    #[test]
    fn too_few_points_produce_no_cap() {
        let plane = y_plane();
        assert!(fill_cap(&[], &plane, Side::Positive, 1e-5, 1e-12).is_empty());
        let two = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        assert!(fill_cap(&two, &plane, Side::Positive, 1e-5, 1e-12).is_empty());
        // Three points that merge into one.
        let merged = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1e-8, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1e-8),
        ];
        assert!(fill_cap(&merged, &plane, Side::Positive, 1e-5, 1e-12).is_empty());
    }

    #[test]
    fn square_cap_has_four_triangles_and_unit_area() {
        let plane = y_plane();
        let cap = fill_cap(&square_points(), &plane, Side::Positive, 1e-5, 1e-12);
        assert_eq!(cap.len(), 4);

        let total_area: f64 = cap.iter().map(|t| t.area()).sum();
        assert!((total_area - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cap_faces_the_requested_side() {
        let plane = y_plane();
        for facing in [Side::Positive, Side::Negative] {
            let cap = fill_cap(&square_points(), &plane, facing, 1e-5, 1e-12);
            let expected = plane.normal() * facing.sign();
            for tri in &cap {
                assert!(tri.normal_unnormalized().dot(&expected) > 0.0);
                for v in tri.v {
                    assert!((v.normal - expected).norm() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn cap_lies_on_the_plane() {
        let plane = Plane::new(Point3::new(0.0, 3.0, 0.0), Vector3::y()).unwrap();
        let points: Vec<Point3<f64>> = square_points()
            .iter()
            .map(|p| Point3::new(p.x, 3.0, p.z))
            .collect();
        let cap = fill_cap(&points, &plane, Side::Negative, 1e-5, 1e-12);
        for tri in &cap {
            for v in tri.v {
                assert!(plane.signed_distance(&v.position).abs() < 1e-9);
            }
        }
    }
}
