//! Actor placement: translation, rotation and scale with an explicitly
//! recomputed model matrix.
use nalgebra::Vector3;

use crate::geometry::{Mat4, Quat, Vec3};

/// Position, rotation and scale of an actor in a stage.
///
/// `model_matrix` is a snapshot taken by the last [`Transform::recompute`];
/// changing the components does not refresh it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    model_matrix: Mat4,
}

impl Transform {
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
            model_matrix: Mat4::identity(),
        }
    }

    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: Vec3::new(x, y, z),
            ..Default::default()
        }
    }

    /// The matrix captured by the last [`recompute`](Self::recompute).
    pub fn model_matrix(&self) -> &Mat4 {
        &self.model_matrix
    }

    /// Rebuild the model matrix as `T * R * S` from the current components,
    /// store it and return a copy.
    pub fn recompute(&mut self) -> Mat4 {
        self.model_matrix = Self::compose(&self.translation, &self.rotation, &self.scale);
        self.model_matrix
    }

    /// Compose `translation * rotation * scale` without touching any state.
    pub fn compose(translation: &Vec3, rotation: &Quat, scale: &Vec3) -> Mat4 {
        Self::translation_matrix(translation.x, translation.y, translation.z)
            * rotation.to_homogeneous()
            * Self::scale_matrix(scale.x, scale.y, scale.z)
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Mat4 {
        Mat4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    /// Replace the rotation with one of `angle` radians about X.
    pub fn set_rotation_x(&mut self, angle: f32) {
        self.rotation = Quat::from_axis_angle(&Vector3::x_axis(), angle);
    }

    pub fn set_rotation_y(&mut self, angle: f32) {
        self.rotation = Quat::from_axis_angle(&Vector3::y_axis(), angle);
    }

    pub fn set_rotation_z(&mut self, angle: f32) {
        self.rotation = Quat::from_axis_angle(&Vector3::z_axis(), angle);
    }

    /// Rotate about the local X axis by `angle` radians.
    pub fn rotate_x(&mut self, angle: f32) {
        self.rotation *= Quat::from_axis_angle(&Vector3::x_axis(), angle);
    }

    pub fn rotate_y(&mut self, angle: f32) {
        self.rotation *= Quat::from_axis_angle(&Vector3::y_axis(), angle);
    }

    pub fn rotate_z(&mut self, angle: f32) {
        self.rotation *= Quat::from_axis_angle(&Vector3::z_axis(), angle);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Quat::identity(), Vec3::new(1.0, 1.0, 1.0))
    }
}
