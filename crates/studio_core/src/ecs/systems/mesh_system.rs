//! Mesh system
//!
//! Collects entities whose mesh changed since the renderer last uploaded it.
//! The renderer drains the list and calls [`MeshSystem::mark_uploaded`].

use crate::ecs::components::MeshComponent;
use crate::ecs::error::Result;
use crate::ecs::{Entity, Signature, System, SystemType, World};

/// Tracks meshes waiting for upload
#[derive(Debug, Default)]
pub struct MeshSystem {
    pending_uploads: Vec<Entity>,
    empty_meshes: usize,
}

impl MeshSystem {
    /// Create a new mesh system
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities with a dirty, non-null mesh as of the last update
    pub fn pending_uploads(&self) -> &[Entity] {
        &self.pending_uploads
    }

    /// Take the pending list, leaving it empty
    pub fn take_pending_uploads(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.pending_uploads)
    }

    /// Number of mesh components with no mesh attached, as of the last update
    pub fn empty_mesh_count(&self) -> usize {
        self.empty_meshes
    }

    /// Clear the dirty flag after the renderer uploaded `entity`'s mesh
    pub fn mark_uploaded(world: &mut World, entity: Entity) -> bool {
        match world.get_component_mut::<MeshComponent>(entity) {
            Some(mesh) if mesh.is_dirty => {
                mesh.clear_dirty();
                true
            }
            _ => false,
        }
    }
}

impl System for MeshSystem {
    fn update(&mut self, world: &mut World, entities: &[Entity], _delta_time: f32) {
        self.pending_uploads.clear();
        self.empty_meshes = 0;
        for &entity in entities {
            let Some(mesh) = world.get_component::<MeshComponent>(entity) else {
                continue;
            };
            if !mesh.has_mesh() {
                self.empty_meshes += 1;
            } else if mesh.is_dirty {
                self.pending_uploads.push(entity);
            }
        }
        if !self.pending_uploads.is_empty() {
            log::trace!("MeshSystem: {} meshes pending upload", self.pending_uploads.len());
        }
    }
}

impl SystemType for MeshSystem {
    const TYPE_NAME: &'static str = "MeshSystem";

    fn required_signature(world: &World) -> Result<Signature> {
        Ok(Signature::EMPTY.with(world.component_type::<MeshComponent>()?))
    }
}
