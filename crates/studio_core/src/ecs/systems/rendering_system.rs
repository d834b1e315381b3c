//! # Rendering System
//!
//! Collects every visible renderable entity into a render queue with its
//! world matrix, mesh and material. The core draws nothing itself; a renderer
//! reads [`RenderSystem::queue`] after the tick.

use super::hierarchy_system::resolve_world_matrix;
use crate::assets::MeshHandle;
use crate::ecs::components::{
    LayerMask, MaterialComponent, MeshComponent, RenderableComponent, TransformComponent,
};
use crate::ecs::error::Result;
use crate::ecs::{Entity, Signature, System, SystemType, World};
use crate::foundation::math::Mat4;

/// One draw submission
#[derive(Debug, Clone)]
pub struct RenderItem {
    /// Source entity
    pub entity: Entity,
    /// World matrix, hierarchy-propagated when available
    pub model: Mat4,
    /// Mesh to draw
    pub mesh: MeshHandle,
    /// Material and fallbacks
    pub material: MaterialComponent,
    /// Layers the entity belongs to
    pub render_mask: LayerMask,
    /// Whether the entity casts shadows
    pub cast_shadows: bool,
    /// Whether the mesh still needs an upload
    pub needs_upload: bool,
}

/// System responsible for collecting renderables
#[derive(Debug)]
pub struct RenderSystem {
    queue: Vec<RenderItem>,
    skipped_hidden: usize,
    enabled: bool,
}

impl RenderSystem {
    /// Create a new rendering system
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            skipped_hidden: 0,
            enabled: true,
        }
    }

    /// Enable or disable the rendering system
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Check if the system is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Items collected during the last update
    pub fn queue(&self) -> &[RenderItem] {
        &self.queue
    }

    /// Items a camera with `cull_mask` should draw
    pub fn visible_to(&self, cull_mask: LayerMask) -> impl Iterator<Item = &RenderItem> {
        self.queue
            .iter()
            .filter(move |item| item.render_mask.intersects(cull_mask))
    }

    /// Number of invisible renderables skipped during the last update
    pub fn skipped_hidden(&self) -> usize {
        self.skipped_hidden
    }

    fn collect(&mut self, world: &World, entities: &[Entity]) {
        for &entity in entities {
            let Some(renderable) = world.get_component::<RenderableComponent>(entity) else {
                continue;
            };
            if !renderable.visible {
                self.skipped_hidden += 1;
                continue;
            }
            let Some(mesh) = world.get_component::<MeshComponent>(entity) else {
                continue;
            };
            let Some(handle) = mesh.mesh.clone() else {
                continue;
            };
            let Some(model) = resolve_world_matrix(world, entity) else {
                continue;
            };
            let material = world
                .get_component::<MaterialComponent>(entity)
                .cloned()
                .unwrap_or_default();

            self.queue.push(RenderItem {
                entity,
                model,
                mesh: handle,
                material,
                render_mask: renderable.render_mask,
                cast_shadows: renderable.cast_shadows,
                needs_upload: mesh.is_dirty,
            });
        }
    }
}

impl Default for RenderSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for RenderSystem {
    fn update(&mut self, world: &mut World, entities: &[Entity], _delta_time: f32) {
        self.queue.clear();
        self.skipped_hidden = 0;
        if !self.enabled {
            return;
        }
        self.collect(world, entities);
        log::trace!(
            "RenderSystem: queued {} items, skipped {} hidden",
            self.queue.len(),
            self.skipped_hidden
        );
    }
}

impl SystemType for RenderSystem {
    const TYPE_NAME: &'static str = "RenderSystem";

    fn required_signature(world: &World) -> Result<Signature> {
        Ok(Signature::EMPTY
            .with(world.component_type::<TransformComponent>()?)
            .with(world.component_type::<MeshComponent>()?)
            .with(world.component_type::<MaterialComponent>()?)
            .with(world.component_type::<RenderableComponent>()?))
    }
}
