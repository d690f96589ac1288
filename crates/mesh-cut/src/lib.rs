//! Plane-based cutting and re-triangulation of triangle meshes.
//!
//! This crate takes an arbitrary triangle mesh and a cutting plane,
//! classifies every triangle against the plane, splits straddling
//! triangles along the intersection edge with interpolated normals and
//! UVs, optionally subdivides large straddling triangles first for a
//! smoother cut line, closes the exposed cross-section with a cap, and
//! assembles fresh vertex/index buffers for the surviving side (and, on
//! request, the removed side too).
//!
//! # Pipeline
//!
//! One cut is a single-pass, stateless transform:
//!
//! 1. **Classify**: signed distance of each vertex to the plane, with
//!    near-zero distances snapped to the plane ([`plane`])
//! 2. **Subdivide**: optional midpoint subdivision of large straddling
//!    triangles ([`subdivide`])
//! 3. **Split**: straddling triangles are clipped along the plane with
//!    interpolated attributes ([`cut`])
//! 4. **Cap**: intersection points close the cross-section as a centroid
//!    fan ([`cap`])
//! 5. **Assemble**: surviving triangles become fresh output buffers
//!    ([`assemble`])
//!
//! # Coordinate System
//!
//! Right-handed coordinates, counter-clockwise winding viewed from
//! outside; normals follow the right-hand rule. Units are whatever the
//! input mesh uses; thresholds like `edge_smoothing` are in the same
//! units.
//!
//! # Quick Start
//!
//! ```
//! use mesh_cut::{cut_mesh, CutParams, Mesh, Plane, Vertex};
//! use nalgebra::{Point3, Vector3};
//!
//! // A triangle poking through the y = 0 plane.
//! let mut mesh = Mesh::new();
//! mesh.vertices.push(Vertex::from_coords(0.0, -1.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(2.0, -1.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0));
//! mesh.faces.push([0, 1, 2]);
//!
//! let plane = Plane::new(Point3::origin(), Vector3::y()).unwrap();
//! let result = cut_mesh(&mesh, &plane, &CutParams::default()).unwrap();
//!
//! match result.kept {
//!     Some(kept) => println!("{} triangles survived", kept.face_count()),
//!     None => println!("nothing left on the kept side: hide the object"),
//! }
//! ```
//!
//! Or with the fluent builder:
//!
//! ```no_run
//! use mesh_cut::{CutBuilder, Mesh, Plane, Side};
//! use nalgebra::{Point3, Vector3};
//!
//! # let mesh = Mesh::new();
//! let result = CutBuilder::new(mesh)
//!     .plane(Plane::new(Point3::origin(), Vector3::y()).unwrap())
//!     .hide(Side::Positive)
//!     .smooth_edges(2)
//!     .execute()
//!     .unwrap();
//! ```
//!
//! # Error Handling
//!
//! Operations return `MeshResult<T>`, which is `Result<T, MeshError>`.
//! Only input validation fails: broken buffers or nonsensical parameters.
//! Everything geometric degrades instead of erroring: degenerate slivers
//! are dropped, a cross-section with fewer than three boundary points gets
//! no cap, and a side with no surviving triangles comes back as `None`
//! (meaning "hide this object", not "the cut failed"). Interactive callers
//! cutting several meshes should log a per-mesh error and continue:
//!
//! ```
//! use mesh_cut::{cut_mesh, CutParams, Mesh, MeshError, Plane};
//! use nalgebra::{Point3, Vector3};
//!
//! let plane = Plane::new(Point3::origin(), Vector3::y()).unwrap();
//! let meshes: Vec<Mesh> = vec![Mesh::new()];
//! for mesh in &meshes {
//!     match cut_mesh(mesh, &plane, &CutParams::default()) {
//!         Ok(result) => { /* swap in result.kept */ }
//!         Err(e) => eprintln!("skipping mesh: {e} [{}]", e.code()),
//!     }
//! }
//! ```
//!
//! # Re-cutting
//!
//! The input mesh is never mutated; keep the pristine original around and
//! re-cut it after moving the plane. Cutting the same original with the
//! same plane and parameters reproduces the same output.

mod builder;
mod error;
pub mod tracing_ext;
mod types;

pub mod assemble;
pub mod cap;
pub mod cut;
pub mod loops;
pub mod measure;
pub mod plane;
pub mod subdivide;

// Re-export core types at crate root
pub use error::{ErrorCode, MeshError, MeshResult};
pub use types::{CutTriangle, CutVertex, Mesh, Triangle, Vertex};

pub use plane::{classify, Plane, Side, TriangleClass};

pub use cut::{cut_mesh, CutParams, CutResult, CutStats};

pub use assemble::{
    compute_tangents, compute_vertex_normals, make_double_sided, FinishOptions, MeshAccumulator,
};
pub use cap::{dedup_points, fill_cap, ordered_boundary};
pub use measure::{cross_section, loop_area, loop_perimeter, newell_normal, CutCrossSection};
pub use subdivide::{subdivide_triangle, MAX_SUBDIVISION_LEVELS};

// Builder API
pub use builder::CutBuilder;

// Loop model for measurement consumers
pub use loops::{AddOutcome, LoopEvent, LoopModel, LoopObserver, PolygonLoop};
