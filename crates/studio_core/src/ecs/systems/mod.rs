//! ECS Systems module
//!
//! The scene registers these in the order they are listed here.

pub mod hierarchy_system;
pub mod mesh_system;
pub mod rendering_system;
pub mod camera_system;
pub mod selection_system;
pub mod lighting;

pub use hierarchy_system::{compose_world_matrix, resolve_world_matrix, HierarchySystem};
pub use mesh_system::MeshSystem;
pub use rendering_system::{RenderItem, RenderSystem};
pub use camera_system::CameraSystem;
pub use selection_system::SelectionSystem;
pub use lighting::{LightEnvironment, LightingSystem, ResolvedLight};
