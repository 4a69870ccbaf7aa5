//! Vertex welding: collapse repeated attribute combinations into shared
//! vertex records with compact, model-local indices.
use std::collections::HashMap;

use crate::error::{AttributeKind, WeldError};
use crate::geometry::{MeshModel, Vec2, Vec3, DEFAULT_NORMAL, DEFAULT_TEX_COORD};

/// 0-based references into the attribute pools for one face corner.
///
/// `None` marks an attribute the face did not supply and never compares equal
/// to a real index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceVertex {
    pub position: usize,
    pub tex_coord: Option<usize>,
    pub normal: Option<usize>,
}

impl FaceVertex {
    pub fn new(position: usize, tex_coord: Option<usize>, normal: Option<usize>) -> Self {
        Self {
            position,
            tex_coord,
            normal,
        }
    }
}

/// Raw attribute values declared by a file, shared by every model in it.
#[derive(Debug, Clone, Default)]
pub struct AttributePools {
    pub positions: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub normals: Vec<Vec3>,
}

impl AttributePools {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Per-model accumulator that assigns combined indices.
///
/// Start a new welder for every model so its indices begin at 0.
#[derive(Debug, Default)]
pub struct VertexWelder {
    combined: HashMap<FaceVertex, u32>,
    positions: Vec<Vec3>,
    tex_coords: Vec<Vec2>,
    normals: Vec<Vec3>,
}

impl VertexWelder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct vertex records produced so far.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Return the combined index for `vertex`, appending a new vertex record
    /// if this combination has not been seen in the current model.
    pub fn weld(&mut self, vertex: FaceVertex, pools: &AttributePools) -> Result<u32, WeldError> {
        if let Some(&index) = self.combined.get(&vertex) {
            return Ok(index);
        }

        let position = lookup(&pools.positions, vertex.position, AttributeKind::Position)?;
        let tex_coord = match vertex.tex_coord {
            Some(i) => lookup(&pools.tex_coords, i, AttributeKind::TexCoord)?,
            None => Vec2::from(DEFAULT_TEX_COORD),
        };
        let normal = match vertex.normal {
            Some(i) => lookup(&pools.normals, i, AttributeKind::Normal)?,
            None => Vec3::from(DEFAULT_NORMAL),
        };

        let index = next_index(self.positions.len())?;
        self.positions.push(position);
        self.tex_coords.push(tex_coord);
        self.normals.push(normal);
        self.combined.insert(vertex, index);
        Ok(index)
    }

    /// Move the welded attributes into a finished model.
    pub fn finish(self, name: String, indices: Vec<u32>) -> MeshModel {
        MeshModel {
            name,
            positions: self.positions,
            tex_coords: self.tex_coords,
            normals: self.normals,
            indices,
        }
    }
}

fn lookup<T: Copy>(pool: &[T], index: usize, kind: AttributeKind) -> Result<T, WeldError> {
    pool.get(index).copied().ok_or(WeldError::OutOfRange {
        kind,
        index,
        len: pool.len(),
    })
}

/// Index of the record appended after `len` existing ones.
fn next_index(len: usize) -> Result<u32, WeldError> {
    u32::try_from(len).map_err(|_| WeldError::TooManyVertices { count: len })
}
