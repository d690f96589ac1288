//! Error types for cut operations with rich diagnostics.
//!
//! Only input validation can fail: a source mesh with broken buffers or a
//! parameter set that makes no sense is rejected up front with a
//! machine-readable code. Geometric trouble encountered *during* a cut
//! (degenerate slivers, near-duplicate intersection points, too few cap
//! points, nothing surviving on a side) is never an error; those cases
//! degrade to "produce less geometry" so an interactive caller is never
//! interrupted mid-frame.
//!
//! # Error Codes
//!
//! Each error has a unique code in the format `CUT-XXXX`:
//! - `CUT-2xxx`: source mesh validation errors
//! - `CUT-21xx`: parameter validation errors

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for cut operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Machine-readable error codes for cut operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Source mesh validation (20xx)
    /// CUT-2001: Face references invalid vertex index
    InvalidVertexIndex = 2001,
    /// CUT-2002: Vertex has NaN or Infinity coordinate
    InvalidCoordinate = 2002,
    /// CUT-2003: Mesh has no vertices or faces
    EmptyMesh = 2003,

    // Parameter validation (21xx)
    /// CUT-2101: Parameter outside its valid range
    InvalidParameter = 2101,
    /// CUT-2102: Cutting plane normal has zero length
    DegeneratePlane = 2102,
    /// CUT-2103: No cutting plane configured
    MissingPlane = 2103,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `CUT-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidVertexIndex => "CUT-2001",
            ErrorCode::InvalidCoordinate => "CUT-2002",
            ErrorCode::EmptyMesh => "CUT-2003",
            ErrorCode::InvalidParameter => "CUT-2101",
            ErrorCode::DegeneratePlane => "CUT-2102",
            ErrorCode::MissingPlane => "CUT-2103",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur when starting a cut operation.
///
/// Each error variant includes a human-readable message, a machine-readable
/// code, and a recovery hint. All are recoverable at per-mesh granularity:
/// skip the offending mesh and continue with others.
#[derive(Debug, Error, Diagnostic)]
pub enum MeshError {
    /// Invalid vertex index in face data.
    #[error(
        "invalid vertex index: face {face_index} references vertex {vertex_index}, but mesh only has {vertex_count} vertices"
    )]
    #[diagnostic(
        code(cut::validation::vertex_index),
        help("Check the mesh export; faces must reference existing vertices.")
    )]
    InvalidVertexIndex {
        face_index: usize,
        vertex_index: u32,
        vertex_count: usize,
    },

    /// Invalid coordinate value (NaN or Infinity).
    #[error("invalid coordinate at vertex {vertex_index}: {coordinate} is {value}")]
    #[diagnostic(
        code(cut::validation::coordinate),
        help(
            "Check for numerical issues in the source data. This often happens with very small or very large values."
        )
    )]
    InvalidCoordinate {
        vertex_index: usize,
        coordinate: &'static str,
        value: f64,
    },

    /// Empty mesh (no vertices or faces).
    #[error("mesh is empty: {details}")]
    #[diagnostic(
        code(cut::validation::empty),
        help("The mesh must have at least one vertex and one face to be cut.")
    )]
    EmptyMesh { details: String },

    /// A cut parameter is outside its valid range.
    #[error("invalid parameter {name}: {value} ({requirement})")]
    #[diagnostic(
        code(cut::params::invalid),
        help("Adjust the named parameter; see CutParams documentation for valid ranges.")
    )]
    InvalidParameter {
        name: &'static str,
        value: f64,
        requirement: &'static str,
    },

    /// The cutting plane normal has zero length.
    #[error("degenerate cutting plane: normal {normal:?} has zero length")]
    #[diagnostic(
        code(cut::params::degenerate_plane),
        help("Supply a non-zero normal direction for the cutting plane.")
    )]
    DegeneratePlane { normal: [f64; 3] },

    /// A cut was requested without configuring a plane.
    #[error("no cutting plane configured")]
    #[diagnostic(
        code(cut::params::missing_plane),
        help("Call CutBuilder::plane() before execute().")
    )]
    MissingPlane,
}

impl MeshError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MeshError::InvalidVertexIndex { .. } => ErrorCode::InvalidVertexIndex,
            MeshError::InvalidCoordinate { .. } => ErrorCode::InvalidCoordinate,
            MeshError::EmptyMesh { .. } => ErrorCode::EmptyMesh,
            MeshError::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            MeshError::DegeneratePlane { .. } => ErrorCode::DegeneratePlane,
            MeshError::MissingPlane => ErrorCode::MissingPlane,
        }
    }
}
