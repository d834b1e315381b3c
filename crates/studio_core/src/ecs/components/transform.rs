//! Transform component for the ECS system
//!
//! Pure data component: position, rotation and scale in a Y-up right-handed
//! frame. The rotation is always a unit quaternion; Euler input is in degrees.

use crate::ecs::Component;
use crate::foundation::math::{utils, Mat3, Mat4, Quat, Vec3};
use nalgebra::Rotation3;

/// ECS Transform component
///
/// Local to the parent when the entity is part of a hierarchy, world space otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    /// Position (Y-up right-handed)
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Component for TransformComponent {
    const TYPE_NAME: &'static str = "Transform";
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl TransformComponent {
    /// Create identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create from position, rotation and scale
    pub fn from_parts(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Decompose an affine TRS matrix. Shear from non-uniform parent scale is
    /// dropped; a mirrored basis is folded into a negative X scale.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let position = Vec3::new(matrix.m14, matrix.m24, matrix.m34);
        let x = Vec3::new(matrix.m11, matrix.m21, matrix.m31);
        let y = Vec3::new(matrix.m12, matrix.m22, matrix.m32);
        let z = Vec3::new(matrix.m13, matrix.m23, matrix.m33);

        let mut scale = Vec3::new(x.norm(), y.norm(), z.norm());
        if x.cross(&y).dot(&z) < 0.0 {
            scale.x = -scale.x;
        }
        if scale.iter().any(|s| s.abs() <= f32::EPSILON) {
            return Self::from_parts(position, Quat::identity(), scale);
        }

        let basis = Mat3::from_columns(&[x / scale.x, y / scale.y, z / scale.z]);
        let rotation = Quat::from_rotation_matrix(&Rotation3::from_matrix_unchecked(basis));
        Self::from_parts(position, rotation, scale)
    }

    /// Convert to transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Set rotation from Euler angles in degrees (X, Y, Z)
    pub fn set_rotation_euler_degrees(&mut self, euler: Vec3) {
        self.rotation = utils::quat_from_euler_degrees(euler);
    }

    /// Current rotation as Euler angles in degrees (X, Y, Z)
    pub fn rotation_euler_degrees(&self) -> Vec3 {
        utils::euler_degrees_from_quat(&self.rotation)
    }

    /// Direction the local -Z axis points to
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::new(0.0, 0.0, -1.0)
    }

    /// Builder pattern: Set position
    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Builder pattern: Set rotation from quaternion
    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: Set rotation from Euler angles in degrees
    #[must_use]
    pub fn with_rotation_euler_degrees(mut self, euler: Vec3) -> Self {
        self.set_rotation_euler_degrees(euler);
        self
    }

    /// Builder pattern: Set scale (uniform)
    #[must_use]
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::new(scale, scale, scale);
        self
    }

    /// Builder pattern: Set scale (non-uniform)
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

/// Transform factory for common configurations
pub struct TransformFactory;

impl TransformFactory {
    /// Transform at `position` whose -Z axis looks at `target`, with `up` as the world up.
    ///
    /// Falls back to the identity rotation when the look direction is degenerate.
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> TransformComponent {
        let rotation = utils::look_rotation(position, target, up).unwrap_or_else(|| {
            log::warn!("look_at: degenerate basis from {position:?} to {target:?}, keeping identity rotation");
            Quat::identity()
        });
        TransformComponent::from_position(position).with_rotation(rotation)
    }
}
