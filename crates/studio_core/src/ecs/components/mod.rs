//! ECS Components module
//!
//! The core component catalog. Every type here is plain data; behavior lives
//! in systems and the scene manager.

pub mod camera;
pub mod hierarchy;
pub mod lighting;
pub mod material;
pub mod mesh;
pub mod name;
pub mod renderable;
pub mod selection;
pub mod transform;

pub use camera::{CameraComponent, ProjectionKind};
pub use hierarchy::HierarchyComponent;
pub use lighting::{LightComponent, LightFactory, LightKind, ShadowSettings};
pub use material::MaterialComponent;
pub use mesh::MeshComponent;
pub use name::NameComponent;
pub use renderable::{LayerMask, RenderableComponent};
pub use selection::SelectableComponent;
pub use transform::{TransformComponent, TransformFactory};
