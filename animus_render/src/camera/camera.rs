/// Camera: passive data container.
///
/// The host computes and owns cameras; the pipeline only reads the view and
/// projection matrices and the world position during a frame.

use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    view_matrix: Mat4,
    projection_matrix: Mat4,
    position: Vec3,
}

impl Camera {
    pub fn new(view: Mat4, projection: Mat4, position: Vec3) -> Self {
        Self {
            view_matrix: view,
            projection_matrix: projection,
            position,
        }
    }

    /// Right-handed perspective camera at `position` looking down -Z
    ///
    /// `fov_y_degrees` is the vertical field of view.
    pub fn perspective(position: Vec3, fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let view = Mat4::look_at_rh(position, position + Vec3::NEG_Z, Vec3::Y);
        let projection = Mat4::perspective_rh_gl(fov_y_degrees.to_radians(), aspect, near, far);
        Self::new(view, projection, position)
    }

    // ===== GETTERS =====

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    // ===== SETTERS =====

    pub fn set_view_matrix(&mut self, view: Mat4) {
        self.view_matrix = view;
    }

    pub fn set_projection_matrix(&mut self, projection: Mat4) {
        self.projection_matrix = projection;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Copy of this camera moved by `offset` in world space
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            view_matrix: self.view_matrix * Mat4::from_translation(-offset),
            projection_matrix: self.projection_matrix,
            position: self.position + offset,
        }
    }
}

impl Default for Camera {
    /// 45° camera at (0, 0, 3), square aspect, near 0.1, far 1000
    fn default() -> Self {
        Self::perspective(Vec3::new(0.0, 0.0, 3.0), 45.0, 1.0, 0.1, 1000.0)
    }
}
