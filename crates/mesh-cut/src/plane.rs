//! Cutting plane representation and triangle classification.
//!
//! A [`Plane`] defines two half-spaces: "positive" on the side its normal
//! points toward, "negative" on the other. Classification computes each
//! vertex's signed distance, optionally snapping near-zero distances to
//! exactly zero so near-tangent triangles do not produce jagged, degenerate
//! splits.

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, MeshResult};

/// One of the two half-spaces defined by a cutting plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    /// The half-space the plane normal points toward.
    Positive,
    /// The half-space opposite the plane normal.
    Negative,
}

impl Side {
    /// The other half-space.
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Positive => Side::Negative,
            Side::Negative => Side::Positive,
        }
    }

    /// Sign of distances lying in this half-space: `+1.0` or `-1.0`.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Side::Positive => 1.0,
            Side::Negative => -1.0,
        }
    }
}

/// How a triangle relates to the cutting plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleClass {
    /// All vertices on the positive side (or exactly on the plane).
    Positive,
    /// All vertices strictly on the negative side, possibly touching the plane.
    Negative,
    /// Vertices on both sides; the triangle must be split.
    Straddling,
}

/// An infinite plane given by a point and a unit normal.
///
/// Immutable for the duration of one cut.
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    point: Point3<f64>,
    normal: Vector3<f64>,
}

impl Plane {
    /// Create a plane from a point on it and a normal direction.
    ///
    /// The normal is normalized; a zero-length normal is rejected.
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> MeshResult<Self> {
        let len = normal.norm();
        if len < f64::EPSILON {
            return Err(MeshError::DegeneratePlane {
                normal: [normal.x, normal.y, normal.z],
            });
        }
        Ok(Self {
            point,
            normal: normal / len,
        })
    }

    /// Create a plane from a unit normal and its signed offset from the
    /// origin (`n · p = offset` for points `p` on the plane).
    pub fn from_offset(normal: Vector3<f64>, offset: f64) -> MeshResult<Self> {
        let len = normal.norm();
        if len < f64::EPSILON {
            return Err(MeshError::DegeneratePlane {
                normal: [normal.x, normal.y, normal.z],
            });
        }
        let normal = normal / len;
        Ok(Self {
            point: Point3::from(normal * offset),
            normal,
        })
    }

    /// A point on the plane.
    #[inline]
    pub fn point(&self) -> Point3<f64> {
        self.point
    }

    /// The plane's unit normal.
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// A plane at the same location with the normal reversed.
    pub fn flipped(&self) -> Plane {
        Plane {
            point: self.point,
            normal: -self.normal,
        }
    }

    /// Signed distance from `p` to the plane.
    ///
    /// Positive on the normal side, negative on the other.
    #[inline]
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        (p - self.point).dot(&self.normal)
    }

    /// Signed distance with near-zero values snapped to exactly zero.
    ///
    /// `smoothing` is the caller's edge-smoothing threshold; distances with
    /// magnitude at or below it are treated as lying on the plane.
    #[inline]
    pub fn snapped_distance(&self, p: &Point3<f64>, smoothing: f64) -> f64 {
        snap(self.signed_distance(p), smoothing)
    }

    /// An orthonormal basis `(u, v)` spanning the plane, with
    /// `u × v = normal`.
    ///
    /// The basis is arbitrary but deterministic for a given normal.
    pub fn basis(&self) -> (Vector3<f64>, Vector3<f64>) {
        let u = if self.normal.x.abs() < 0.9 {
            Vector3::x().cross(&self.normal).normalize()
        } else {
            Vector3::y().cross(&self.normal).normalize()
        };
        let v = self.normal.cross(&u);
        (u, v)
    }

    /// Project `p` into the plane's 2D basis, relative to `origin`.
    pub fn project_2d(&self, p: &Point3<f64>, origin: &Point3<f64>) -> (f64, f64) {
        let (u, v) = self.basis();
        let rel = p - origin;
        (rel.dot(&u), rel.dot(&v))
    }
}

/// Snap a signed distance to exactly zero when within `smoothing` of the
/// plane.
#[inline]
pub fn snap(distance: f64, smoothing: f64) -> f64 {
    if distance.abs() <= smoothing {
        0.0
    } else {
        distance
    }
}

/// Classify a triangle from its three (snapped) signed distances.
///
/// A triangle with strictly positive and strictly negative distances
/// straddles the plane. Otherwise it belongs wholly to one side; a triangle
/// lying entirely on the plane is bucketed with the positive side.
pub fn classify(distances: [f64; 3]) -> TriangleClass {
    let positive = distances.iter().any(|&d| d > 0.0);
    let negative = distances.iter().any(|&d| d < 0.0);

    match (positive, negative) {
        (true, true) => TriangleClass::Straddling,
        (false, true) => TriangleClass::Negative,
        // All-zero (coplanar) triangles land here with the positive side.
        _ => TriangleClass::Positive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xz_plane() -> Plane {
        Plane::new(Point3::origin(), Vector3::y()).unwrap()
    }

    #[test]
    fn signed_distance_sign_convention() {
        let plane = xz_plane();
        assert!(plane.signed_distance(&Point3::new(0.0, 2.0, 0.0)) > 0.0);
        assert!(plane.signed_distance(&Point3::new(0.0, -2.0, 0.0)) < 0.0);
        assert_eq!(plane.signed_distance(&Point3::new(5.0, 0.0, -3.0)), 0.0);
    }

    #[test]
    fn normal_is_normalized() {
        let plane = Plane::new(Point3::origin(), Vector3::new(0.0, 10.0, 0.0)).unwrap();
        assert!((plane.normal().norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_normal_is_rejected() {
        assert!(Plane::new(Point3::origin(), Vector3::zeros()).is_err());
        assert!(Plane::from_offset(Vector3::zeros(), 1.0).is_err());
    }

    #[test]
    fn from_offset_places_point_on_plane() {
        let plane = Plane::from_offset(Vector3::z(), 2.5).unwrap();
        assert_eq!(plane.signed_distance(&Point3::new(1.0, 1.0, 2.5)), 0.0);
    }

    #[test]
    fn snapping_zeroes_near_plane_distances() {
        let plane = xz_plane();
        let p = Point3::new(0.0, 1e-7, 0.0);
        assert!(plane.signed_distance(&p) > 0.0);
        assert_eq!(plane.snapped_distance(&p, 1e-5), 0.0);
        assert!(plane.snapped_distance(&p, 1e-9) > 0.0);
    }

    #[test]
    fn classification_buckets() {
        assert_eq!(classify([1.0, 2.0, 0.5]), TriangleClass::Positive);
        assert_eq!(classify([-1.0, -2.0, -0.5]), TriangleClass::Negative);
        assert_eq!(classify([1.0, -1.0, 2.0]), TriangleClass::Straddling);
        // Touching the plane does not make a triangle straddle.
        assert_eq!(classify([0.0, 0.0, 1.0]), TriangleClass::Positive);
        assert_eq!(classify([0.0, 0.0, -1.0]), TriangleClass::Negative);
        // Coplanar triangles bucket with the positive side.
        assert_eq!(classify([0.0, 0.0, 0.0]), TriangleClass::Positive);
        // One vertex on the plane, the other two on opposite sides.
        assert_eq!(classify([0.0, 1.0, -1.0]), TriangleClass::Straddling);
    }

    #[test]
    fn basis_is_orthonormal() {
        for normal in [
            Vector3::x(),
            Vector3::y(),
            Vector3::z(),
            Vector3::new(1.0, 2.0, 3.0),
        ] {
            let plane = Plane::new(Point3::origin(), normal).unwrap();
            let (u, v) = plane.basis();
            assert!((u.norm() - 1.0).abs() < 1e-12);
            assert!((v.norm() - 1.0).abs() < 1e-12);
            assert!(u.dot(&v).abs() < 1e-12);
            assert!(u.dot(&plane.normal()).abs() < 1e-12);
            assert!((u.cross(&v) - plane.normal()).norm() < 1e-12);
        }
    }
}
