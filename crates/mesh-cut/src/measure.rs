//! Perimeter and area measurement for polygon loops and cut
//! cross-sections.
//!
//! These are consumers of the cut: once a plane has sliced a mesh, the
//! ordered boundary loop can be measured, and user-placed point loops (see
//! [`crate::loops`]) reuse the same arithmetic.

use nalgebra::{Point3, Vector3};

use crate::cap::ordered_boundary;
use crate::plane::Plane;

/// Measured summary of one cut cross-section.
#[derive(Debug, Clone)]
pub struct CutCrossSection {
    /// Boundary points, deduplicated and ordered around the centroid.
    pub points: Vec<Point3<f64>>,

    /// Total boundary length.
    pub perimeter: f64,

    /// Enclosed area.
    pub area: f64,

    /// Centroid of the boundary points.
    pub centroid: Point3<f64>,

    /// Plane the section lies in.
    pub plane_origin: Point3<f64>,
    pub plane_normal: Vector3<f64>,
}

/// Total edge length of a point loop.
///
/// For a closed loop the edge from the last point back to the first is
/// included; for an open polyline it is not.
pub fn loop_perimeter(points: &[Point3<f64>], closed: bool) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let mut perimeter = 0.0;
    for pair in points.windows(2) {
        perimeter += (pair[1] - pair[0]).norm();
    }
    if closed {
        perimeter += (points[0] - points[points.len() - 1]).norm();
    }
    perimeter
}

/// Newell normal of an ordered polygon: the area-weighted normal summed
/// edge by edge around the centroid.
///
/// Returns `None` for degenerate polygons (fewer than 3 points or
/// near-zero enclosed area).
pub fn newell_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    newell_vector(points).and_then(|v| {
        let len = v.norm();
        if len > f64::EPSILON {
            Some(v / len)
        } else {
            None
        }
    })
}

/// Enclosed area of an ordered, closed planar polygon.
///
/// Half the magnitude of the Newell vector, the 3D generalization of the
/// shoelace formula, independent of which plane the loop lies in. Returns
/// 0.0 for degenerate input. Self-intersecting orderings under-report, as
/// with any shoelace variant.
pub fn loop_area(points: &[Point3<f64>]) -> f64 {
    newell_vector(points).map(|v| v.norm() / 2.0).unwrap_or(0.0)
}

fn newell_vector(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    if points.len() < 3 {
        return None;
    }
    let n = points.len();
    let centroid_coords = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / n as f64;
    let centroid = Point3::from(centroid_coords);

    let mut normal = Vector3::zeros();
    for i in 0..n {
        let v0 = points[i] - centroid;
        let v1 = points[(i + 1) % n] - centroid;
        normal += v0.cross(&v1);
    }
    Some(normal)
}

/// Measure the cross-section described by a set of cut-edge points.
///
/// Deduplicates and orders the points in the plane (the same preparation
/// the cap builder uses), then reports perimeter, enclosed area and
/// centroid. An input with fewer than 3 unique points measures as an empty
/// section anchored at the plane origin.
pub fn cross_section(
    points: &[Point3<f64>],
    plane: &Plane,
    merge_tolerance: f64,
) -> CutCrossSection {
    let boundary = ordered_boundary(points, plane, merge_tolerance);

    if boundary.len() < 3 {
        return CutCrossSection {
            points: boundary,
            perimeter: 0.0,
            area: 0.0,
            centroid: plane.point(),
            plane_origin: plane.point(),
            plane_normal: plane.normal(),
        };
    }

    let sum = boundary
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    let centroid = Point3::from(sum / boundary.len() as f64);

    CutCrossSection {
        perimeter: loop_perimeter(&boundary, true),
        area: loop_area(&boundary),
        centroid,
        plane_origin: plane.point(),
        plane_normal: plane.normal(),
        points: boundary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn square_perimeter_and_area() {
        let square = unit_square();
        assert!((loop_perimeter(&square, true) - 4.0).abs() < 1e-12);
        assert!((loop_perimeter(&square, false) - 3.0).abs() < 1e-12);
        assert!((loop_area(&square) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn newell_normal_is_perpendicular_to_the_loop() {
        let n = newell_normal(&unit_square()).unwrap();
        assert!((n.norm() - 1.0).abs() < 1e-12);
        assert!(n.x.abs() < 1e-12);
        assert!(n.z.abs() < 1e-12);
    }

    #[test]
    fn degenerate_loops_measure_zero() {
        assert_eq!(loop_area(&[]), 0.0);
        assert_eq!(
            loop_area(&[Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]),
            0.0
        );
        let collinear = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert_eq!(loop_area(&collinear), 0.0);
        assert!(newell_normal(&collinear).is_none());
    }

    #[test]
    fn cross_section_orders_and_measures() {
        let plane = Plane::new(Point3::origin(), Vector3::y()).unwrap();
        // Shuffled square corners with a duplicate.
        let points = vec![
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0 + 1e-9, 0.0, 0.0),
        ];
        let section = cross_section(&points, &plane, 1e-5);
        assert_eq!(section.points.len(), 4);
        assert!((section.perimeter - 4.0).abs() < 1e-9);
        assert!((section.area - 1.0).abs() < 1e-9);
        assert!((section.centroid - Point3::new(0.5, 0.0, 0.5)).norm() < 1e-9);
    }

    #[test]
    fn too_few_points_measure_empty() {
        let plane = Plane::new(Point3::origin(), Vector3::y()).unwrap();
        let section = cross_section(&[Point3::new(1.0, 0.0, 0.0)], &plane, 1e-5);
        assert_eq!(section.area, 0.0);
        assert_eq!(section.perimeter, 0.0);
        assert_eq!(section.centroid, plane.point());
    }
}
