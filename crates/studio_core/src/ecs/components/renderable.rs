//! Renderable component for entities that can be drawn
//!
//! Carries visibility and shadow flags plus layer masks. The render system
//! only queues entities whose `visible` flag is set.

use crate::ecs::Component;
use bitflags::bitflags;

bitflags! {
    /// 32 render layers; an entity is drawn by a camera when their masks intersect
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LayerMask: u32 {
        /// Regular scene geometry
        const DEFAULT = 1 << 0;
        /// Editor gizmos and helpers
        const EDITOR = 1 << 1;
        /// Transient edit-preview geometry
        const PREVIEW = 1 << 2;
        /// Selection outlines
        const SELECTION = 1 << 3;
        /// User layers start here
        const USER_0 = 1 << 8;
        /// Every layer
        const ALL = u32::MAX;
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Component for entities that can be rendered
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableComponent {
    /// Whether this object is visible
    pub visible: bool,

    /// Whether this object casts shadows
    pub cast_shadows: bool,

    /// Whether this object receives shadows
    pub receive_shadows: bool,

    /// Distance beyond which a lower level of detail may be used
    pub lod_distance: f32,

    /// Layers this object belongs to
    pub render_mask: LayerMask,

    /// Layers this object is culled against
    pub cull_mask: LayerMask,
}

impl Component for RenderableComponent {
    const TYPE_NAME: &'static str = "Renderable";
}

impl Default for RenderableComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderableComponent {
    /// Visible, shadow casting and receiving, default layer
    pub fn new() -> Self {
        Self {
            visible: true,
            cast_shadows: true,
            receive_shadows: true,
            lod_distance: 100.0,
            render_mask: LayerMask::DEFAULT,
            cull_mask: LayerMask::ALL,
        }
    }

    /// Hidden renderable (useful for pre-loading)
    pub fn hidden() -> Self {
        Self {
            visible: false,
            ..Self::new()
        }
    }

    /// Set visibility
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether a camera with `camera_mask` should draw this object
    pub fn is_drawn_by(&self, camera_mask: LayerMask) -> bool {
        self.visible && self.render_mask.intersects(camera_mask)
    }
}
