//! Geometry primitives and the indexed mesh model.
use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector2, Vector3};

use crate::error::{MeshError, MeshResult};

pub type Vec2 = Vector2<f32>;
pub type Vec3 = Vector3<f32>;
pub type Quat = UnitQuaternion<f32>;
pub type Mat4 = Matrix4<f32>;

/// Scalars per interleaved vertex record: position (3), texcoord (2), normal (3).
pub const VERTEX_COMPONENTS: usize = 8;
/// Byte stride of one interleaved vertex record.
pub const VERTEX_STRIDE_BYTES: usize = VERTEX_COMPONENTS * std::mem::size_of::<f32>();
pub const POSITION_OFFSET_BYTES: usize = 0;
pub const TEX_COORD_OFFSET_BYTES: usize = 3 * std::mem::size_of::<f32>();
pub const NORMAL_OFFSET_BYTES: usize = 5 * std::mem::size_of::<f32>();

/// Texture coordinate used when a face vertex has none.
pub const DEFAULT_TEX_COORD: [f32; 2] = [0.0, 0.0];
/// Normal used when a face vertex has none.
pub const DEFAULT_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];

/// Indexed triangle mesh with parallel per-vertex attribute arrays.
///
/// `positions`, `tex_coords` and `normals` always have the same length, and
/// `indices` is a triangle list addressing them from 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshModel {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Interleave every vertex as `[px, py, pz, u, v, nx, ny, nz]`, with the
    /// position transformed by `matrix`.
    ///
    /// The sequence is lazy; call again to restart it, or clone the iterator.
    pub fn transformed_vertices(&self, matrix: &Mat4) -> impl Iterator<Item = f32> + Clone + '_ {
        let matrix = *matrix;
        (0..self.positions.len()).flat_map(move |i| {
            let p = matrix.transform_point(&Point3::from(self.positions[i]));
            let t = self.tex_coords[i];
            let n = self.normals[i];
            [p.x, p.y, p.z, t.x, t.y, n.x, n.y, n.z]
        })
    }

    /// Interleaved vertices in model space.
    pub fn vertices(&self) -> Vec<f32> {
        self.transformed_vertices(&Mat4::identity()).collect()
    }

    /// Check the attribute-length, triangle-list and index-range invariants.
    pub fn validate(&self) -> MeshResult<()> {
        let vertex_count = self.positions.len();
        if self.tex_coords.len() != vertex_count || self.normals.len() != vertex_count {
            return Err(MeshError::AttributeLengthMismatch {
                name: self.name.clone(),
                positions: vertex_count,
                tex_coords: self.tex_coords.len(),
                normals: self.normals.len(),
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::IncompleteTriangle {
                name: self.name.clone(),
                count: self.indices.len(),
            });
        }
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfRange {
                name: self.name.clone(),
                index,
                vertex_count,
            });
        }
        Ok(())
    }

    /// Create an indexed cube centred on the origin, four vertices per face.
    pub fn cube(name: impl Into<String>, size: f32) -> Self {
        let h = size / 2.0;
        // Corners are counter-clockwise seen from outside.
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            // Front
            ([0.0, 0.0, 1.0], [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]]),
            // Back
            ([0.0, 0.0, -1.0], [[h, -h, -h], [-h, -h, -h], [-h, h, -h], [h, h, -h]]),
            // Top
            ([0.0, 1.0, 0.0], [[-h, h, h], [h, h, h], [h, h, -h], [-h, h, -h]]),
            // Bottom
            ([0.0, -1.0, 0.0], [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]]),
            // Right
            ([1.0, 0.0, 0.0], [[h, -h, h], [h, -h, -h], [h, h, -h], [h, h, h]]),
            // Left
            ([-1.0, 0.0, 0.0], [[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]]),
        ];
        let corner_uvs: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

        let mut mesh = Self::new(name);
        for (normal, corners) in faces {
            let base = mesh.positions.len() as u32;
            for (corner, uv) in corners.iter().zip(corner_uvs) {
                mesh.positions.push(Vec3::from(*corner));
                mesh.tex_coords.push(Vec2::from(uv));
                mesh.normals.push(Vec3::from(normal));
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }
}
