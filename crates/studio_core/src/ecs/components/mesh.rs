//! Mesh component
//!
//! Holds a shared handle to an external mesh plus the dirty flag renderers
//! use to know when to re-upload. Swapping the handle is the only way the
//! geometry of an entity changes.

use crate::assets::MeshHandle;
use crate::ecs::Component;

/// Shared mesh reference attached to an entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshComponent {
    /// Mesh asset; `None` for placeholder objects with no geometry yet
    pub mesh: Option<MeshHandle>,

    /// Set when the mesh changed and the renderer has not uploaded it yet
    pub is_dirty: bool,
}

impl Component for MeshComponent {
    const TYPE_NAME: &'static str = "Mesh";
}

impl MeshComponent {
    /// Component referencing `mesh`, flagged for upload
    pub fn new(mesh: MeshHandle) -> Self {
        Self {
            mesh: Some(mesh),
            is_dirty: true,
        }
    }

    /// Component with no geometry
    pub fn empty() -> Self {
        Self::default()
    }

    /// Swap in a new mesh handle and flag it for upload
    pub fn set_mesh(&mut self, mesh: MeshHandle) {
        self.mesh = Some(mesh);
        self.is_dirty = true;
    }

    /// Whether a mesh is attached
    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    /// Called by the renderer after uploading
    pub fn clear_dirty(&mut self) {
        self.is_dirty = false;
    }
}
