//! Selection state component
//!
//! Tracks whether an entity is selected or hovered in the viewport, whether it
//! may be selected at all, and the colors used to highlight it.

use crate::ecs::Component;
use crate::foundation::math::Vec4;

/// Component tracking selection state of an entity
///
/// # Examples
/// ```
/// # use studio_core::ecs::components::SelectableComponent;
/// let mut selectable = SelectableComponent::default();
/// selectable.select();
/// assert!(selectable.is_highlighted());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SelectableComponent {
    /// Whether this entity is currently selected
    pub selected: bool,

    /// Whether the pointer is over this entity
    pub hovered: bool,

    /// Whether the entity can be selected at all
    pub selectable: bool,

    /// Outline color when selected (RGBA)
    pub selection_color: Vec4,

    /// Outline color when hovered (RGBA)
    pub hover_color: Vec4,
}

impl Component for SelectableComponent {
    const TYPE_NAME: &'static str = "Selectable";
}

impl Default for SelectableComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectableComponent {
    /// Create a new selectable component with default values
    pub fn new() -> Self {
        Self {
            selected: false,
            hovered: false,
            selectable: true,
            selection_color: Vec4::new(1.0, 0.6, 0.1, 1.0),
            hover_color: Vec4::new(1.0, 1.0, 1.0, 0.5),
        }
    }

    /// Component that never accepts selection (helpers, preview ghosts)
    pub fn locked() -> Self {
        Self {
            selectable: false,
            ..Self::new()
        }
    }

    /// Mark entity as selected; returns whether the state changed
    pub fn select(&mut self) -> bool {
        if self.selectable && !self.selected {
            self.selected = true;
            true
        } else {
            false
        }
    }

    /// Mark entity as deselected; returns whether the state changed
    pub fn deselect(&mut self) -> bool {
        std::mem::replace(&mut self.selected, false)
    }

    /// Set hover state; returns whether the state changed
    pub fn set_hovered(&mut self, hovered: bool) -> bool {
        let hovered = hovered && self.selectable;
        std::mem::replace(&mut self.hovered, hovered) != hovered
    }

    /// Check if entity is either selected or hovered
    pub fn is_highlighted(&self) -> bool {
        self.selected || self.hovered
    }

    /// Color to outline with, if any. Selection wins over hover.
    pub fn highlight_color(&self) -> Option<Vec4> {
        if self.selected {
            Some(self.selection_color)
        } else if self.hovered {
            Some(self.hover_color)
        } else {
            None
        }
    }
}
