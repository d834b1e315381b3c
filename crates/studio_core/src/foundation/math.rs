//! Math utilities and types
//!
//! Provides the nalgebra aliases used by components, systems and edit operations.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, UnitQuaternion, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// World up direction (Y-up, right-handed)
pub const WORLD_UP: [f32; 3] = [0.0, 1.0, 0.0];

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;

    /// Tolerance used when deciding whether two directions are parallel
    pub const PARALLEL_EPSILON: f32 = 1e-6;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Mat3, Quat, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Quaternion from Euler angles in degrees (roll about X, pitch about Y, yaw about Z)
    pub fn quat_from_euler_degrees(euler: Vec3) -> Quat {
        Quat::from_euler_angles(deg_to_rad(euler.x), deg_to_rad(euler.y), deg_to_rad(euler.z))
    }

    /// Euler angles in degrees for a rotation, inverse of [`quat_from_euler_degrees`]
    pub fn euler_degrees_from_quat(rotation: &Quat) -> Vec3 {
        let (roll, pitch, yaw) = rotation.euler_angles();
        Vec3::new(rad_to_deg(roll), rad_to_deg(pitch), rad_to_deg(yaw))
    }

    /// Rotation whose local -Z axis looks from `position` towards `target`.
    ///
    /// Builds a right-handed basis: `forward = normalize(target - position)`,
    /// `right = normalize(forward × up)`, `up' = right × forward`. Returns `None`
    /// when the basis is degenerate (target on top of position, or forward parallel to up).
    pub fn look_rotation(position: Vec3, target: Vec3, up: Vec3) -> Option<Quat> {
        let to_target = target - position;
        if to_target.magnitude() < constants::PARALLEL_EPSILON {
            return None;
        }
        let forward = to_target.normalize();
        let right = forward.cross(&up.normalize());
        if right.magnitude() < constants::PARALLEL_EPSILON {
            return None;
        }
        let right = right.normalize();
        let camera_up = right.cross(&forward);

        // Columns are the local X, Y and Z axes expressed in world space.
        let basis = Mat3::new(
            right.x, camera_up.x, -forward.x,
            right.y, camera_up.y, -forward.y,
            right.z, camera_up.z, -forward.z,
        );
        Some(Quat::from_matrix(&basis))
    }
}
