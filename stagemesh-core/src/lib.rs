//! stagemesh Core Library - OBJ models and stage buffers
//!
//! This library loads OBJ files with vertex welding, and merges placed models
//! in a stage into draw-ready vertex/index buffers.
//!
//! Nothing here talks to a GPU. [`MeshModel::transformed_vertices`] and the
//! [`Stage`] buffer queries produce plain `f32`/`u32` data for whatever
//! renderer uploads it.

pub mod error;
pub mod geometry;
pub mod obj;
pub mod registry;
pub mod stage;
pub mod transform;
pub mod weld;

// Re-export commonly used types
pub use error::{MeshError, ObjError, StageError, WeldError};
pub use geometry::{
    Mat4, MeshModel, Quat, Vec2, Vec3, NORMAL_OFFSET_BYTES, POSITION_OFFSET_BYTES,
    TEX_COORD_OFFSET_BYTES, VERTEX_COMPONENTS, VERTEX_STRIDE_BYTES,
};
pub use obj::{load_obj_file, parse_obj, ObjDocument, ParseWarning, WarningKind};
pub use registry::{LoadReport, ModelRegistry, DEFAULT_MODEL_NAME};
pub use stage::{Stage, StageActor, StageBuffers, CAMERA_ACTOR_NAME};
pub use transform::Transform;
pub use weld::{AttributePools, FaceVertex, VertexWelder};
