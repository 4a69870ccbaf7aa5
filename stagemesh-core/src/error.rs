//! Error types for OBJ loading, mesh validation and stage queries.

use std::path::PathBuf;
use thiserror::Error;

/// Which attribute pool a face component refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Position,
    TexCoord,
    Normal,
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AttributeKind::Position => "position",
            AttributeKind::TexCoord => "texture coordinate",
            AttributeKind::Normal => "normal",
        };
        f.write_str(name)
    }
}

/// Errors raised while welding a face vertex into a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WeldError {
    /// A face vertex referenced a pool element that was never declared.
    #[error("{kind} index {index} is out of range (pool holds {len})")]
    OutOfRange {
        kind: AttributeKind,
        index: usize,
        len: usize,
    },

    /// The model already holds as many vertex records as a `u32` index can address.
    #[error("model already holds {count} vertex records, the limit of 32-bit indices")]
    TooManyVertices { count: usize },
}

/// Result type alias for OBJ parsing.
pub type ObjResult<T> = Result<T, ObjError>;

/// Fatal errors that abort parsing of an OBJ file.
///
/// Recoverable per-line problems are reported as
/// [`ParseWarning`](crate::obj::ParseWarning) instead.
#[derive(Debug, Error)]
pub enum ObjError {
    /// The file could not be read.
    #[error("failed to read OBJ file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A coordinate field is not a valid number.
    #[error("{file}:{line}: invalid number '{literal}' in '{element}' element")]
    InvalidNumber {
        file: String,
        line: usize,
        element: &'static str,
        literal: String,
    },

    /// An element has fewer coordinates than it requires.
    #[error("{file}:{line}: '{element}' element needs {expected} components, found {found}")]
    MissingComponents {
        file: String,
        line: usize,
        element: &'static str,
        expected: usize,
        found: usize,
    },

    /// A face-vertex token is not of the form `p[/t][/n]`.
    #[error("{file}:{line}: malformed face vertex '{token}'")]
    InvalidFaceVertex {
        file: String,
        line: usize,
        token: String,
    },

    /// A face vertex could not be welded into the current model.
    #[error("{file}:{line}: {source}")]
    Weld {
        file: String,
        line: usize,
        #[source]
        source: WeldError,
    },
}

/// Result type alias for mesh model validation.
pub type MeshResult<T> = Result<T, MeshError>;

/// Violations of the [`MeshModel`](crate::geometry::MeshModel) invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    #[error("model '{name}' has mismatched attribute arrays ({positions} positions, {tex_coords} texcoords, {normals} normals)")]
    AttributeLengthMismatch {
        name: String,
        positions: usize,
        tex_coords: usize,
        normals: usize,
    },

    #[error("model '{name}' has {count} indices, which is not a whole number of triangles")]
    IncompleteTriangle { name: String, count: usize },

    #[error("model '{name}' index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        name: String,
        index: u32,
        vertex_count: usize,
    },
}

/// Result type alias for stage queries.
pub type StageResult<T> = Result<T, StageError>;

/// Errors raised while resolving or merging stage geometry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    /// An actor references a model that is not in the registry.
    #[error("actor '{actor}' references model '{model}', which is not loaded")]
    ModelNotFound { actor: String, model: String },

    /// A merged index does not fit the requested index width.
    #[error("merged index {index} does not fit in a 16-bit index buffer")]
    IndexOverflow { index: u32 },

    /// The merged setpieces hold more vertex records than a `u32` index can address.
    #[error("setpiece '{actor}' pushes the merged buffer past the limit of 32-bit indices")]
    VertexLimit { actor: String },
}
