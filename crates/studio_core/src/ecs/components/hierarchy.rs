//! Hierarchy component
//!
//! Parent link plus ordered child list. The scene manager keeps both sides
//! consistent: `parent.children` contains `child` exactly when
//! `child.parent == parent`, and the graph stays a forest.

use crate::ecs::{Component, Entity};

/// Parent/child links of an entity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HierarchyComponent {
    /// Parent entity, `Entity::NULL` for roots
    pub parent: Entity,

    /// Children in attachment order
    pub children: Vec<Entity>,
}

impl Component for HierarchyComponent {
    const TYPE_NAME: &'static str = "Hierarchy";
}

impl HierarchyComponent {
    /// Root node with no children
    pub fn root() -> Self {
        Self::default()
    }

    /// Whether this node has no parent
    pub fn is_root(&self) -> bool {
        self.parent.is_null()
    }

    /// Parent, or `None` for roots
    pub fn parent(&self) -> Option<Entity> {
        (!self.parent.is_null()).then_some(self.parent)
    }

    /// Whether `child` is listed
    pub fn has_child(&self, child: Entity) -> bool {
        self.children.contains(&child)
    }

    /// Append `child` unless already listed; returns whether it was added
    pub fn add_child(&mut self, child: Entity) -> bool {
        if self.has_child(child) {
            false
        } else {
            self.children.push(child);
            true
        }
    }

    /// Remove `child`, keeping the order of the rest; returns whether it was listed
    pub fn remove_child(&mut self, child: Entity) -> bool {
        let before = self.children.len();
        self.children.retain(|&c| c != child);
        before != self.children.len()
    }
}
