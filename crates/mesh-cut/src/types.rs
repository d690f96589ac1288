//! Core mesh data types.

use nalgebra::{Point2, Point3, Vector3};

/// A vertex in the mesh with optional shading attributes.
///
/// Coordinates are unit-agnostic. Normals and texture coordinates are
/// optional; a mesh either carries them on every vertex or they are treated
/// as absent for the whole mesh (see [`Mesh::has_normals`]).
#[derive(Debug, Clone)]
pub struct Vertex {
    /// 3D position.
    pub position: Point3<f64>,

    /// Unit normal vector.
    pub normal: Option<Vector3<f64>>,

    /// Texture coordinate.
    pub uv: Option<Point2<f64>>,

    /// Tangent vector for normal-mapped lighting, derived from UVs.
    pub tangent: Option<Vector3<f64>>,
}

impl Vertex {
    /// Create a new vertex with only position set.
    #[inline]
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: None,
            uv: None,
            tangent: None,
        }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Create a vertex with position and normal.
    #[inline]
    pub fn with_normal(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            position,
            normal: Some(normal),
            uv: None,
            tangent: None,
        }
    }

    /// Create a vertex with position, normal and texture coordinate.
    #[inline]
    pub fn with_attributes(
        position: Point3<f64>,
        normal: Vector3<f64>,
        uv: Point2<f64>,
    ) -> Self {
        Self {
            position,
            normal: Some(normal),
            uv: Some(uv),
            tangent: None,
        }
    }
}

/// A triangle mesh with indexed vertices and faces.
///
/// Each face is `[v0, v1, v2]` with counter-clockwise winding when viewed
/// from outside; normals follow the right-hand rule. Storing faces as index
/// triples makes the "index count is a multiple of three" invariant hold by
/// construction.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as indices into the vertex array.
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Number of vertices in the mesh.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces (triangles) in the mesh.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if mesh is empty (no vertices or faces).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Whether every vertex carries a normal.
    pub fn has_normals(&self) -> bool {
        !self.vertices.is_empty() && self.vertices.iter().all(|v| v.normal.is_some())
    }

    /// Whether every vertex carries a texture coordinate.
    pub fn has_uvs(&self) -> bool {
        !self.vertices.is_empty() && self.vertices.iter().all(|v| v.uv.is_some())
    }

    /// Compute the axis-aligned bounding box.
    /// Returns (min_corner, max_corner) or None if mesh is empty.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        if self.vertices.is_empty() {
            return None;
        }

        let mut min = self.vertices[0].position;
        let mut max = self.vertices[0].position;

        for vertex in &self.vertices[1..] {
            let p = &vertex.position;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Some((min, max))
    }

    /// Iterate over triangles, yielding Triangle structs with actual vertex data.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().map(|&[i0, i1, i2]| Triangle {
            v0: self.vertices[i0 as usize].position,
            v1: self.vertices[i1 as usize].position,
            v2: self.vertices[i2 as usize].position,
        })
    }

    /// Get a specific triangle by face index.
    pub fn triangle(&self, face_idx: usize) -> Option<Triangle> {
        self.faces.get(face_idx).map(|&[i0, i1, i2]| Triangle {
            v0: self.vertices[i0 as usize].position,
            v1: self.vertices[i1 as usize].position,
            v2: self.vertices[i2 as usize].position,
        })
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|tri| tri.area()).sum()
    }

    /// Compute the signed volume of the mesh.
    ///
    /// Sum of signed tetrahedra volumes formed by each face and the origin.
    /// For a closed mesh with outward-facing normals (CCW winding viewed
    /// from outside) this is positive; for open meshes the value is not a
    /// meaningful volume.
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;

        for &[i0, i1, i2] in &self.faces {
            let v0 = self.vertices[i0 as usize].position.coords;
            let v1 = self.vertices[i1 as usize].position.coords;
            let v2 = self.vertices[i2 as usize].position.coords;
            volume += v0.dot(&v1.cross(&v2));
        }

        volume / 6.0
    }

    /// Absolute enclosed volume, regardless of orientation.
    ///
    /// Only meaningful for closed (watertight) meshes.
    #[inline]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }
}

/// A triangle with concrete vertex positions.
///
/// Utility type for geometric calculations. Winding is counter-clockwise
/// when viewed from the front (normal points toward viewer).
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Compute the (unnormalized) face normal via cross product.
    /// The direction follows the right-hand rule with CCW winding.
    #[inline]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        e1.cross(&e2)
    }

    /// Compute the unit face normal.
    /// Returns None for degenerate triangles (zero area).
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal_unnormalized();
        let len = n.norm();
        if len > f64::EPSILON {
            Some(n / len)
        } else {
            None
        }
    }

    /// Compute the triangle's area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() / 2.0
    }

    /// Compute the triangle's centroid.
    #[inline]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }
}

/// A free-standing vertex record used while cutting.
///
/// Unlike [`Vertex`], attributes are always materialized: a mesh without
/// normals or UVs gets face normals and zero UVs filled in, and the
/// assembler decides which attributes survive into the output.
#[derive(Debug, Clone, Copy)]
pub struct CutVertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
    pub uv: Point2<f64>,
}

impl CutVertex {
    /// Create a cut vertex from explicit attributes.
    #[inline]
    pub fn new(position: Point3<f64>, normal: Vector3<f64>, uv: Point2<f64>) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    /// Linearly interpolate between two vertices at parameter `t`.
    ///
    /// The normal is re-normalized after interpolation; a degenerate
    /// interpolated normal falls back to `a`'s normal.
    pub fn lerp(a: &CutVertex, b: &CutVertex, t: f64) -> CutVertex {
        let position = a.position + (b.position - a.position) * t;
        let normal = a.normal * (1.0 - t) + b.normal * t;
        let len = normal.norm();
        let normal = if len > f64::EPSILON {
            normal / len
        } else {
            a.normal
        };
        let uv = a.uv + (b.uv - a.uv) * t;
        CutVertex {
            position,
            normal,
            uv,
        }
    }
}

/// A free-standing triangle pulled out of the mesh for cutting.
///
/// Once a triangle enters the cut pipeline it is detached from the source
/// index buffer, so subdivision and splitting can emit new, unshared
/// vertices.
#[derive(Debug, Clone, Copy)]
pub struct CutTriangle {
    pub v: [CutVertex; 3],
}

impl CutTriangle {
    /// Create a cut triangle from three vertex records.
    #[inline]
    pub fn new(v0: CutVertex, v1: CutVertex, v2: CutVertex) -> Self {
        Self { v: [v0, v1, v2] }
    }

    /// The positions-only view of this triangle.
    #[inline]
    pub fn positions(&self) -> Triangle {
        Triangle::new(self.v[0].position, self.v[1].position, self.v[2].position)
    }

    /// Compute the (unnormalized) geometric normal.
    #[inline]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        self.positions().normal_unnormalized()
    }

    /// Compute the triangle's area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.positions().area()
    }

    /// Reverse winding by swapping the second and third vertices.
    #[inline]
    pub fn flip(&mut self) {
        self.v.swap(1, 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_area_and_normal() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        );
        assert!((tri.area() - 2.0).abs() < 1e-12);
        let n = tri.normal().unwrap();
        assert!((n - Vector3::z()).norm() < 1e-12);
    }

    #[test]
    fn degenerate_triangle_has_no_normal() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        assert!(tri.normal().is_none());
        assert_eq!(tri.area(), 0.0);
    }

    #[test]
    fn cut_vertex_lerp_interpolates_all_attributes() {
        let a = CutVertex::new(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::x(),
            Point2::new(0.0, 0.0),
        );
        let b = CutVertex::new(
            Point3::new(2.0, 0.0, 0.0),
            Vector3::y(),
            Point2::new(1.0, 0.5),
        );
        let mid = CutVertex::lerp(&a, &b, 0.5);
        assert!((mid.position.x - 1.0).abs() < 1e-12);
        assert!((mid.normal.norm() - 1.0).abs() < 1e-12);
        assert!((mid.uv.x - 0.5).abs() < 1e-12);
        assert!((mid.uv.y - 0.25).abs() < 1e-12);
    }

    #[test]
    fn mesh_bounds_and_surface_area() {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.faces.push([0, 1, 2]);

        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 0.0));
        assert!((mesh.surface_area() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn attribute_availability() {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::with_normal(
            Point3::new(0.0, 0.0, 0.0),
            Vector3::z(),
        ));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        assert!(!mesh.has_normals());
        assert!(!mesh.has_uvs());

        mesh.vertices[1].normal = Some(Vector3::z());
        assert!(mesh.has_normals());
    }
}
