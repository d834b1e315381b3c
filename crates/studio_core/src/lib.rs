//! # Studio Core
//!
//! Scene runtime for a 3D modeling studio: an Entity-Component-System world,
//! a scene layer with names, hierarchies and object factories, and an
//! edit-preview engine for non-destructive mesh editing.
//!
//! ## Features
//!
//! - **ECS Architecture**: dense component arrays, signature-matched systems
//! - **Scene Management**: named entities, parent/child forest, cameras and lights
//! - **Edit Preview**: ghost entities, undo/redo history, commit/cancel
//! - **Renderer-agnostic**: owns scene state, never pixels
//!
//! ## Quick Start
//!
//! ```rust
//! use studio_core::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut scene = SceneManager::new()?;
//!     let cube = scene.create_object("cube", Vec3::new(0.0, 0.0, 0.0))?;
//!     scene.set_mesh(cube, MeshHandle::new(Mesh::cube()))?;
//!
//!     let mut engine = EditPreviewEngine::new();
//!     let params = PreviewParams::new().with("factor", 2.0);
//!     assert!(engine.start_preview(scene.world_mut(), cube, OperationKind::Scale, params));
//!     assert!(engine.commit_preview(scene.world_mut()));
//!
//!     scene.update(1.0 / 60.0);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod assets;
pub mod ecs;
pub mod scene;
pub mod preview;

/// Common imports for studio users
pub mod prelude {
    pub use crate::{
        assets::{Material, MaterialHandle, Mesh, MeshHandle},
        config::Config,
        ecs::{
            components::{
                CameraComponent, HierarchyComponent, LightComponent, LightKind,
                MaterialComponent, MeshComponent, NameComponent, RenderableComponent,
                SelectableComponent, TransformComponent,
            },
            systems::{
                CameraSystem, HierarchySystem, LightingSystem, MeshSystem, RenderSystem,
                SelectionSystem,
            },
            Component, EcsError, Entity, Signature, System, SystemType, World, WorldConfig,
        },
        foundation::math::{Mat4, Quat, Vec3},
        preview::{
            EditPreviewEngine, OperationKind, PreviewConfig, PreviewError, PreviewParams,
            PreviewState,
        },
        scene::{SceneConfig, SceneError, SceneManager},
    };
}
