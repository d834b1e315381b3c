//! Camera component
//!
//! Projection parameters only; the view comes from the entity's transform.

use crate::ecs::components::LayerMask;
use crate::ecs::Component;
use crate::foundation::math::{utils, Mat4};

/// Projection model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionKind {
    /// Perspective projection driven by `fov_degrees`
    #[default]
    Perspective,
    /// Orthographic projection driven by `ortho_size`
    Orthographic,
}

/// Camera parameters attached to an entity
#[derive(Debug, Clone, PartialEq)]
pub struct CameraComponent {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clip plane distance
    pub near: f32,
    /// Far clip plane distance
    pub far: f32,
    /// Width / height
    pub aspect: f32,
    /// Projection model
    pub projection: ProjectionKind,
    /// Half height of the orthographic view volume
    pub ortho_size: f32,
    /// Whether this camera may be picked as the active camera
    pub is_active: bool,
    /// Preferred over other active cameras
    pub is_main: bool,
    /// Layers this camera draws
    pub cull_mask: LayerMask,
}

impl Component for CameraComponent {
    const TYPE_NAME: &'static str = "Camera";
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
            projection: ProjectionKind::Perspective,
            ortho_size: 5.0,
            is_active: true,
            is_main: false,
            cull_mask: LayerMask::ALL,
        }
    }
}

impl CameraComponent {
    /// Perspective camera
    pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_degrees,
            aspect,
            near,
            far,
            ..Default::default()
        }
    }

    /// Orthographic camera with half height `ortho_size`
    pub fn orthographic(ortho_size: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            projection: ProjectionKind::Orthographic,
            ortho_size,
            aspect,
            near,
            far,
            ..Default::default()
        }
    }

    /// Projection matrix (right-handed, OpenGL clip depth)
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            ProjectionKind::Perspective => {
                Mat4::new_perspective(self.aspect, utils::deg_to_rad(self.fov_degrees), self.near, self.far)
            }
            ProjectionKind::Orthographic => {
                let half_h = self.ortho_size;
                let half_w = half_h * self.aspect;
                Mat4::new_orthographic(-half_w, half_w, -half_h, half_h, self.near, self.far)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_perspective_maps_near_plane() {
        let camera = CameraComponent::perspective(90.0, 1.0, 1.0, 100.0);
        let clip = camera.projection_matrix().transform_point(&Point3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(clip.z, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_orthographic_bounds() {
        let camera = CameraComponent::orthographic(2.0, 2.0, 0.1, 10.0);
        let edge = camera.projection_matrix().transform_point(&Point3::new(4.0, 2.0, -1.0));
        assert_relative_eq!(edge.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(edge.y, 1.0, epsilon = 1e-5);
    }
}
